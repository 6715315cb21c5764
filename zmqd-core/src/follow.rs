use std::{
    io::{ErrorKind, Read},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{debug, warn};
use zmqd_types::{Record, ZmqdError, ZmqdResult};

use crate::serialization::{FrameBuffer, ReadStats, DEFAULT_READ_CHUNK};

/// Интервал опроса источника, когда данных пока нет.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Читатель растущего источника (файла, который дописывает подписчик).
///
/// В отличие от [`crate::RecordReader`], EOF и таймауты чтения означают
/// «данных пока нет»: читатель ждёт `poll_interval` и пробует снова.
/// Завершается только по флагу остановки или на повреждённом потоке.
pub struct FollowReader<R: Read> {
    reader: R,
    frames: FrameBuffer,
    read_buf: Vec<u8>,
    stats: ReadStats,
    stop_flag: Arc<AtomicBool>,
    poll_interval: Duration,
    idle_polls: u64,
    done: bool,
}

impl<R: Read> FollowReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: inner,
            frames: FrameBuffer::default(),
            read_buf: vec![0u8; DEFAULT_READ_CHUNK],
            stats: ReadStats::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            poll_interval: DEFAULT_POLL_INTERVAL,
            idle_polls: 0,
            done: false,
        }
    }

    pub fn poll_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Использовать внешний флаг остановки (например, общий с обработчиком Ctrl+C).
    pub fn with_stop_flag(
        mut self,
        flag: Arc<AtomicBool>,
    ) -> Self {
        self.stop_flag = flag;
        self
    }

    /// Флаг остановки. Установите в `true` для завершения чтения.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Блокирует до следующей записи, остановки или ошибки.
    pub fn next_record(&mut self) -> Option<ZmqdResult<Record>> {
        if self.done {
            return None;
        }

        loop {
            match self.frames.next_record(&mut self.stats) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(e) => {
                    warn!("Stopping follow: {e}");
                    self.done = true;
                    return Some(Err(e));
                }
            }

            if self.stopped() {
                return None;
            }

            match self.reader.read(&mut self.read_buf) {
                Ok(0) => self.idle(),
                Ok(n) => self.frames.extend(&self.read_buf[..n]),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                    ) =>
                {
                    self.idle()
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(ZmqdError::Io(e)));
                }
            }
        }
    }

    fn stopped(&mut self) -> bool {
        if !self.stop_flag.load(Ordering::Relaxed) {
            return false;
        }

        // Незавершённая запись при остановке отбрасывается
        let tail = self.frames.discard();
        if tail > 0 {
            debug!("Follow stopped with {tail} bytes of a partial record");
            self.stats.truncated_bytes += tail as u64;
        }

        self.done = true;
        true
    }

    fn idle(&mut self) {
        self.idle_polls += 1;

        if !self.stop_flag.load(Ordering::Relaxed) {
            std::thread::sleep(self.poll_interval);
        }
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Сколько раз источник не отдал новых данных.
    pub fn idle_polls(&self) -> u64 {
        self.idle_polls
    }

    /// Байт, ожидающих дочитывания незавершённой записи.
    pub fn pending_bytes(&self) -> usize {
        self.frames.pending_len()
    }
}

impl<R: Read> Iterator for FollowReader<R> {
    type Item = ZmqdResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}
