use std::io::{BufWriter, ErrorKind, Read, Write};

use log::{debug, warn};
use zmqd_types::{Record, WireVersion, ZmqdError, ZmqdResult};

use crate::format::{encode_v1, encode_v2, Frame, RecordExt};

/// Размер порции чтения из источника по умолчанию.
pub const DEFAULT_READ_CHUNK: usize = 64 * 1024;

/// Потоковый читатель записей ZMQD.
///
/// Ленивый, конечный, только вперёд. Усечённая последняя запись завершает
/// последовательность без ошибки; неверный magic или неизвестная версия
/// возвращаются как ошибка один раз, после чего чтение прекращается.
pub struct RecordReader<R: Read> {
    reader: R,
    frames: FrameBuffer,
    read_buf: Vec<u8>,
    stats: ReadStats,
    eof: bool,
    done: bool,
}

/// Потоковый писатель записей ZMQD.
pub struct RecordWriter<W: Write> {
    writer: BufWriter<W>,
    force_v2: bool,
    records_written: u64,
    bytes_written: u64,
}

/// Статистика, накопленная читателем в процессе чтения.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadStats {
    /// Успешно прочитанных записей.
    pub records_ok: u64,
    /// Из них версии 1.
    pub v1_records: u64,
    /// Из них версии 2.
    pub v2_records: u64,
    /// Всего байт в успешно прочитанных записях.
    pub bytes_processed: u64,
    /// Байт в усечённом хвосте, отброшенном в конце потока.
    pub truncated_bytes: u64,
}

/// Накопитель байтов, из начала которого выделяются целые записи.
///
/// Общий для [`RecordReader`] и [`crate::FollowReader`].
#[derive(Debug, Default)]
pub(crate) struct FrameBuffer {
    pending: Vec<u8>,
    start: usize,
    offset: u64,
}

impl ReadStats {
    fn record(
        &mut self,
        record: &Record,
        consumed: usize,
    ) {
        self.records_ok += 1;
        self.bytes_processed += consumed as u64;
        match record.version {
            WireVersion::V1 => self.v1_records += 1,
            WireVersion::V2 => self.v2_records += 1,
        }
    }
}

impl FrameBuffer {
    pub(crate) fn extend(
        &mut self,
        data: &[u8],
    ) {
        // Сдвигаем разобранное только перед дозаписью, а не после каждой записи
        if self.start > 0 {
            self.pending.drain(..self.start);
            self.start = 0;
        }
        self.pending.extend_from_slice(data);
    }

    /// Выделяет следующую целую запись, если она уже в буфере.
    pub(crate) fn next_record(
        &mut self,
        stats: &mut ReadStats,
    ) -> ZmqdResult<Option<Record>> {
        let buf = &self.pending[self.start..];
        if buf.is_empty() {
            return Ok(None);
        }

        match Record::deserialize(buf, self.offset)? {
            Frame::Complete { record, consumed } => {
                self.start += consumed;
                self.offset += consumed as u64;
                stats.record(&record, consumed);
                Ok(Some(record))
            }
            Frame::Incomplete => Ok(None),
        }
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len() - self.start
    }

    /// Отбрасывает неразобранный остаток, возвращает его длину.
    pub(crate) fn discard(&mut self) -> usize {
        let n = self.pending_len();
        self.pending.clear();
        self.start = 0;
        self.offset += n as u64;
        n
    }

    /// Смещение в потоке первого неразобранного байта.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }
}

impl<R: Read> RecordReader<R> {
    /// Создаёт читатель. Ничего не читает до первого вызова [`Self::next_record`].
    pub fn new(inner: R) -> Self {
        Self::with_chunk_size(inner, DEFAULT_READ_CHUNK)
    }

    pub fn with_chunk_size(
        inner: R,
        chunk_size: usize,
    ) -> Self {
        Self {
            reader: inner,
            frames: FrameBuffer::default(),
            read_buf: vec![0u8; chunk_size.max(1)],
            stats: ReadStats::default(),
            eof: false,
            done: false,
        }
    }

    /// Возвращает следующую запись или `None` в конце потока.
    pub fn next_record(&mut self) -> Option<ZmqdResult<Record>> {
        if self.done {
            return None;
        }

        loop {
            match self.frames.next_record(&mut self.stats) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(e) => {
                    warn!("Stopping read: {e}");
                    self.done = true;
                    return Some(Err(e));
                }
            }

            if self.eof {
                let tail = self.frames.discard();

                if tail > 0 {
                    // Усечённая последняя запись — это конец потока, не ошибка
                    debug!(
                        "Truncated tail: {tail} bytes dropped at offset {}",
                        self.frames.offset() - tail as u64
                    );
                    self.stats.truncated_bytes += tail as u64;
                }

                self.done = true;
                return None;
            }

            match self.reader.read(&mut self.read_buf) {
                Ok(0) => self.eof = true,
                Ok(n) => self.frames.extend(&self.read_buf[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ZmqdError::Io(e)));
                }
            }
        }
    }

    /// Накопленная статистика чтения.
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Смещение в потоке, до которого записи уже выданы.
    pub fn position(&self) -> u64 {
        self.frames.offset()
    }

    /// Возвращает исходный источник.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = ZmqdResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

impl<R: Read> std::iter::FusedIterator for RecordReader<R> {}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            force_v2: false,
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Всегда писать V2, даже если частей не больше двух.
    pub fn force_v2(
        mut self,
        force: bool,
    ) -> Self {
        self.force_v2 = force;
        self
    }

    /// Записывает multipart-сообщение, выбирая версию записи.
    ///
    /// До двух частей без `force_v2` — V1 (недостающие части пустые),
    /// иначе V2.
    pub fn write_parts<P: AsRef<[u8]>>(
        &mut self,
        parts: &[P],
        recv_time_ns: u64,
    ) -> ZmqdResult<()> {
        if !self.force_v2 && parts.len() <= 2 {
            let header = parts.first().map(|p| p.as_ref()).unwrap_or(&[]);
            let payload = parts.get(1).map(|p| p.as_ref()).unwrap_or(&[]);
            self.write_v1(header, payload, recv_time_ns)
        } else {
            self.write_v2(parts, recv_time_ns)
        }
    }

    pub fn write_v1(
        &mut self,
        header: &[u8],
        payload: &[u8],
        recv_time_ns: u64,
    ) -> ZmqdResult<()> {
        let bytes = encode_v1(header, payload, recv_time_ns)?;
        self.write_raw(&bytes)
    }

    pub fn write_v2<P: AsRef<[u8]>>(
        &mut self,
        parts: &[P],
        recv_time_ns: u64,
    ) -> ZmqdResult<()> {
        let bytes = encode_v2(parts, recv_time_ns)?;
        self.write_raw(&bytes)
    }

    /// Записывает готовую запись в её собственной версии.
    pub fn write_record(
        &mut self,
        record: &Record,
    ) -> ZmqdResult<()> {
        let bytes = record.serialize()?;
        self.write_raw(&bytes)
    }

    fn write_raw(
        &mut self,
        bytes: &[u8],
    ) -> ZmqdResult<()> {
        self.writer.write_all(bytes)?;
        self.records_written += 1;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Сбрасывает буфер и возвращает исходный приёмник.
    pub fn finish(mut self) -> ZmqdResult<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| ZmqdError::Io(e.into_error()))
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Convenience: читает все записи до конца потока.
///
/// Первая же ошибка формата прерывает чтение и возвращается.
pub fn read_all_records<R: Read>(reader: &mut RecordReader<R>) -> ZmqdResult<Vec<Record>> {
    let mut records = Vec::new();
    while let Some(result) = reader.next_record() {
        records.push(result?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use zmqd_types::MalformedReason;

    use super::*;

    fn v2_bytes(n: usize) -> Vec<u8> {
        let mut raw = Vec::new();
        for i in 0..n {
            let parts = vec![vec![i as u8; 20], Vec::new(), vec![0xAB; i + 1]];
            raw.extend_from_slice(&encode_v2(&parts, i as u64).unwrap());
        }
        raw
    }

    #[test]
    fn test_reader_iterates_records() {
        let mut reader = RecordReader::new(Cursor::new(v2_bytes(3)));
        let mut count = 0;

        while let Some(res) = reader.next_record() {
            let rec = res.unwrap();
            assert_eq!(rec.recv_time_ns, count);
            assert_eq!(rec.parts.len(), 3);
            count += 1;
        }

        assert_eq!(count, 3);
        assert_eq!(reader.stats().records_ok, 3);
        assert_eq!(reader.stats().v2_records, 3);
        assert_eq!(reader.stats().truncated_bytes, 0);
    }

    #[test]
    fn test_small_chunks_reassemble_records() {
        let raw = v2_bytes(5);
        let total = raw.len() as u64;
        let mut reader = RecordReader::with_chunk_size(Cursor::new(raw), 3);
        let records = read_all_records(&mut reader).unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(reader.stats().bytes_processed, total);
        assert_eq!(reader.position(), total);
    }

    #[test]
    fn test_empty_source_ends_cleanly() {
        let mut reader = RecordReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(reader.next_record().is_none());
        assert_eq!(reader.stats().records_ok, 0);
    }

    #[test]
    fn test_truncated_tail_keeps_previous_records() {
        let mut raw = v2_bytes(2);
        let full = raw.len();
        let third = v2_bytes(3)[full..].to_vec();
        raw.extend_from_slice(&third[..third.len() - 1]);

        let mut reader = RecordReader::new(Cursor::new(raw));
        let records = read_all_records(&mut reader).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(reader.stats().truncated_bytes, third.len() as u64 - 1);
    }

    #[test]
    fn test_bad_magic_stops_reading() {
        let mut raw = v2_bytes(1);
        let good = raw.len();
        raw.extend_from_slice(b"JUNKJUNKJUNK");
        raw.extend_from_slice(&v2_bytes(1));

        let mut reader = RecordReader::new(Cursor::new(raw));

        assert!(reader.next_record().unwrap().is_ok());
        match reader.next_record() {
            Some(Err(ZmqdError::MalformedStream { offset, reason })) => {
                assert_eq!(offset, good as u64);
                assert_eq!(reason, MalformedReason::BadMagic(*b"JUNK"));
            }
            other => panic!("expected MalformedStream, got {other:?}"),
        }

        // Без ресинхронизации: дальше ничего
        assert!(reader.next_record().is_none());
        assert_eq!(reader.stats().records_ok, 1);
    }

    #[test]
    fn test_writer_chooses_version() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_parts(&[b"h".to_vec()], 1).unwrap();
        writer.write_parts(&[b"h".to_vec(), b"p".to_vec()], 2).unwrap();
        writer
            .write_parts(&[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()], 3)
            .unwrap();
        assert_eq!(writer.records_written(), 3);

        let raw = writer.finish().unwrap();
        let records: Vec<_> = RecordReader::new(Cursor::new(raw))
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(records[0].version, WireVersion::V1);
        assert_eq!(records[0].parts, vec![b"h".to_vec(), Vec::new()]);
        assert_eq!(records[1].version, WireVersion::V1);
        assert_eq!(records[2].version, WireVersion::V2);
    }

    #[test]
    fn test_writer_force_v2() {
        let mut writer = RecordWriter::new(Vec::new()).force_v2(true);
        writer.write_parts::<Vec<u8>>(&[], 7).unwrap();
        let raw = writer.finish().unwrap();

        let mut reader = RecordReader::new(Cursor::new(raw));
        let rec = reader.next_record().unwrap().unwrap();

        assert_eq!(rec.version, WireVersion::V2);
        assert!(rec.parts.is_empty());
        assert_eq!(reader.stats().v2_records, 1);
    }

    #[test]
    fn test_write_record_round_trip() {
        let rec = Record::new(WireVersion::V2, 99, vec![vec![1, 2, 3], vec![]]);
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(&rec).unwrap();
        let bytes_written = writer.bytes_written();
        let raw = writer.finish().unwrap();

        assert_eq!(raw.len() as u64, bytes_written);

        let mut reader = RecordReader::new(Cursor::new(raw));
        assert_eq!(reader.next_record().unwrap().unwrap(), rec);
    }
}
