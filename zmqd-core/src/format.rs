//! Спецификация контейнера ZMQD (версии записи 1 и 2)
//!
//! Файл представляет собой последовательность записей без общего заголовка.
//! Все многобайтовые числа хранятся в порядке little-endian.
//!
//! ```text
//! [0..4]   MAGIC        b"ZMQD"
//! [4..6]   VERSION      u16  — 1 или 2
//! [6..8]   RESERVED     u16  — игнорируется
//!
//! V1: [8..12] HEADER_LEN u32, [12..16] PAYLOAD_LEN u32, [16..24] RECV_TIME_NS u64,
//!     затем HEADER и PAYLOAD.
//! V2: [8..16] RECV_TIME_NS u64, [16..18] NUM_PARTS u16,
//!     затем NUM_PARTS раз: PART_LEN u32 + байты части.
//! ```

use zmqd_types::{Record, WireVersion, ZmqdError, ZmqdResult};

use crate::binary::{read_u16_le, read_u32_le, read_u64_le, write_u16_le, write_u32_le, write_u64_le};

/// Магическое число каждой записи: b"ZMQD"
pub const ZMQD_MAGIC: [u8; 4] = [b'Z', b'M', b'Q', b'D'];

/// magic + version + reserved
pub const ZMQD_PREAMBLE_SIZE: usize = 8;

/// Фиксированная часть записи V1 (вместе с преамбулой)
pub const ZMQD_V1_FIXED_SIZE: usize = 24;

/// Фиксированная часть записи V2 (вместе с преамбулой)
pub const ZMQD_V2_FIXED_SIZE: usize = 18;

/// Префикс длины одной части в V2
pub const ZMQD_PART_LEN_SIZE: usize = 4;

/// Результат попытки декодировать запись из начала буфера.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Запись целиком в буфере; `consumed` — её размер в байтах
    Complete { record: Record, consumed: usize },
    /// Байтов пока недостаточно (или хвост файла усечён)
    Incomplete,
}

/// Сериализация / десериализация записей контейнера.
pub trait RecordExt: Sized {
    /// Сериализует запись в байты её собственной версии.
    fn serialize(&self) -> ZmqdResult<Vec<u8>>;

    /// Декодирует одну запись из начала `buf`.
    ///
    /// `offset` — смещение начала буфера в потоке, нужно только для ошибок.
    fn deserialize(
        buf: &[u8],
        offset: u64,
    ) -> ZmqdResult<Frame>;
}

impl RecordExt for Record {
    fn serialize(&self) -> ZmqdResult<Vec<u8>> {
        match self.version {
            WireVersion::V1 => {
                // Пустой список частей — это V1 с пустыми header и payload
                let (header, payload): (&[u8], &[u8]) = match self.parts.as_slice() {
                    [] => (&[], &[]),
                    [header] => (header.as_slice(), &[]),
                    [header, payload] => (header.as_slice(), payload.as_slice()),
                    _ => {
                        return Err(ZmqdError::format_violation(format!(
                            "V1 record carries at most 2 parts, got {}",
                            self.parts.len()
                        )))
                    }
                };
                encode_v1(header, payload, self.recv_time_ns)
            }
            WireVersion::V2 => encode_v2(&self.parts, self.recv_time_ns),
        }
    }

    fn deserialize(
        buf: &[u8],
        offset: u64,
    ) -> ZmqdResult<Frame> {
        if buf.len() < ZMQD_MAGIC.len() {
            return Ok(Frame::Incomplete);
        }

        let magic = [buf[0], buf[1], buf[2], buf[3]];
        if magic != ZMQD_MAGIC {
            return Err(ZmqdError::bad_magic(offset, magic));
        }

        if buf.len() < ZMQD_PREAMBLE_SIZE {
            return Ok(Frame::Incomplete);
        }

        let mut off = ZMQD_MAGIC.len();
        let raw_version = read_u16_le(buf, &mut off);
        off += 2; // reserved

        match WireVersion::from_u16(raw_version) {
            Some(WireVersion::V1) => decode_v1(buf, off),
            Some(WireVersion::V2) => decode_v2(buf, off),
            None => Err(ZmqdError::unknown_version(offset, raw_version)),
        }
    }
}

fn decode_v1(
    buf: &[u8],
    mut off: usize,
) -> ZmqdResult<Frame> {
    if buf.len() < ZMQD_V1_FIXED_SIZE {
        return Ok(Frame::Incomplete);
    }

    let header_len = read_u32_le(buf, &mut off) as usize;
    let payload_len = read_u32_le(buf, &mut off) as usize;
    let recv_time_ns = read_u64_le(buf, &mut off);

    let total = ZMQD_V1_FIXED_SIZE as u64 + header_len as u64 + payload_len as u64;
    if (buf.len() as u64) < total {
        return Ok(Frame::Incomplete);
    }

    let header = &buf[off..off + header_len];
    let payload = &buf[off + header_len..off + header_len + payload_len];

    // Наследие V1: запись с пустыми header и payload не несёт частей вообще.
    // Неизвестно, признак ли это повреждения, поэтому поведение сохранено.
    let parts = if header.is_empty() && payload.is_empty() {
        Vec::new()
    } else {
        vec![header.to_vec(), payload.to_vec()]
    };

    Ok(Frame::Complete {
        record: Record::new(WireVersion::V1, recv_time_ns, parts),
        consumed: total as usize,
    })
}

fn decode_v2(
    buf: &[u8],
    mut off: usize,
) -> ZmqdResult<Frame> {
    if buf.len() < ZMQD_V2_FIXED_SIZE {
        return Ok(Frame::Incomplete);
    }

    let recv_time_ns = read_u64_le(buf, &mut off);
    let num_parts = read_u16_le(buf, &mut off) as usize;

    // Сначала убеждаемся, что запись целиком в буфере, и только потом копируем
    let mut spans = Vec::with_capacity(num_parts);
    for _ in 0..num_parts {
        if buf.len() - off < ZMQD_PART_LEN_SIZE {
            return Ok(Frame::Incomplete);
        }
        let len = read_u32_le(buf, &mut off) as usize;
        if buf.len() - off < len {
            return Ok(Frame::Incomplete);
        }
        spans.push(off..off + len);
        off += len;
    }

    let parts = spans.into_iter().map(|r| buf[r].to_vec()).collect();

    Ok(Frame::Complete {
        record: Record::new(WireVersion::V2, recv_time_ns, parts),
        consumed: off,
    })
}

/// Кодирует запись V1 (header + payload).
pub fn encode_v1(
    header: &[u8],
    payload: &[u8],
    recv_time_ns: u64,
) -> ZmqdResult<Vec<u8>> {
    let header_len = part_len_u32(header)?;
    let payload_len = part_len_u32(payload)?;

    let mut fixed = [0u8; ZMQD_V1_FIXED_SIZE];
    let mut off = write_preamble(&mut fixed, WireVersion::V1);
    write_u32_le(&mut fixed, &mut off, header_len);
    write_u32_le(&mut fixed, &mut off, payload_len);
    write_u64_le(&mut fixed, &mut off, recv_time_ns);

    let mut buf = Vec::with_capacity(ZMQD_V1_FIXED_SIZE + header.len() + payload.len());
    buf.extend_from_slice(&fixed);
    buf.extend_from_slice(header);
    buf.extend_from_slice(payload);

    Ok(buf)
}

/// Кодирует запись V2 с произвольным числом частей.
pub fn encode_v2<P: AsRef<[u8]>>(
    parts: &[P],
    recv_time_ns: u64,
) -> ZmqdResult<Vec<u8>> {
    let num_parts = u16::try_from(parts.len()).map_err(|_| {
        ZmqdError::format_violation(format!(
            "V2 record carries at most {} parts, got {}",
            u16::MAX,
            parts.len()
        ))
    })?;

    let body: usize = parts
        .iter()
        .map(|p| ZMQD_PART_LEN_SIZE + p.as_ref().len())
        .sum();

    let mut fixed = [0u8; ZMQD_V2_FIXED_SIZE];
    let mut off = write_preamble(&mut fixed, WireVersion::V2);
    write_u64_le(&mut fixed, &mut off, recv_time_ns);
    write_u16_le(&mut fixed, &mut off, num_parts);

    let mut buf = Vec::with_capacity(ZMQD_V2_FIXED_SIZE + body);
    buf.extend_from_slice(&fixed);

    for part in parts {
        let part = part.as_ref();
        buf.extend_from_slice(&part_len_u32(part)?.to_le_bytes());
        buf.extend_from_slice(part);
    }

    Ok(buf)
}

fn write_preamble(
    buf: &mut [u8],
    version: WireVersion,
) -> usize {
    buf[..4].copy_from_slice(&ZMQD_MAGIC);
    let mut off = 4;
    write_u16_le(buf, &mut off, version.as_u16());
    write_u16_le(buf, &mut off, 0); // reserved
    off
}

fn part_len_u32(part: &[u8]) -> ZmqdResult<u32> {
    u32::try_from(part.len()).map_err(|_| {
        ZmqdError::format_violation(format!("Part of {} bytes exceeds u32 length", part.len()))
    })
}
