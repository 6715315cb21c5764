/// Версия записи контейнера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum WireVersion {
    /// Устаревший формат: ровно две части (header, payload)
    V1 = 1,
    /// Произвольное число частей, у каждой свой префикс длины
    V2 = 2,
}

/// Одна захваченная запись (multipart-сообщение).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Версия, в которой запись лежала в потоке
    pub version: WireVersion,
    /// Время приёма в наносекундах (Unix epoch)
    pub recv_time_ns: u64,
    /// Части сообщения в исходном порядке
    pub parts: Vec<Vec<u8>>,
}

impl WireVersion {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            1 => Some(WireVersion::V1),
            2 => Some(WireVersion::V2),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

impl Record {
    pub fn new(
        version: WireVersion,
        recv_time_ns: u64,
        parts: Vec<Vec<u8>>,
    ) -> Self {
        Record {
            version,
            recv_time_ns,
            parts,
        }
    }

    /// Часть с индексом `idx`, если она есть.
    pub fn part(
        &self,
        idx: usize,
    ) -> Option<&[u8]> {
        self.parts.get(idx).map(Vec::as_slice)
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Суммарный размер всех частей в байтах.
    pub fn payload_len(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }
}
