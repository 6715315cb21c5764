//! Чтение little-endian полей по смещению. Границы проверяет вызывающий код.

use byteorder::{ByteOrder, LittleEndian};

pub fn read_u8_at(
    buf: &[u8],
    off: &mut usize,
) -> u8 {
    let v = buf[*off];
    *off += 1;
    v
}

pub fn read_u16_le(
    buf: &[u8],
    off: &mut usize,
) -> u16 {
    let v = LittleEndian::read_u16(&buf[*off..*off + 2]);
    *off += 2;
    v
}

pub fn read_u32_le(
    buf: &[u8],
    off: &mut usize,
) -> u32 {
    let v = LittleEndian::read_u32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_u64_le(
    buf: &[u8],
    off: &mut usize,
) -> u64 {
    let v = LittleEndian::read_u64(&buf[*off..*off + 8]);
    *off += 8;
    v
}

pub fn read_f32_le(
    buf: &[u8],
    off: &mut usize,
) -> f32 {
    let v = LittleEndian::read_f32(&buf[*off..*off + 4]);
    *off += 4;
    v
}
