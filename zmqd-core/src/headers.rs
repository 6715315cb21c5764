//! Кодеки фиксированных заголовков внутри частей записи.
//!
//! Part0 — заголовок среза LSE (20 байт), Part8 — AUX-заголовок (64 или 56
//! байт в зависимости от ревизии). Блок неподходящего размера считается
//! отсутствующим: это не ошибка потока, запись просто пропускается.

use crc32fast::Hasher;
use zmqd_types::{AuxHeader, AuxRevision, SliceHeader, ZmqdError, ZmqdResult};

use crate::binary::{
    read_f32_le, read_u16_le, read_u32_le, read_u64_le, read_u8_at, write_f32_le, write_u16_le,
    write_u32_le, write_u64_le, write_u8_at,
};

/// Размер заголовка среза
pub const SLICE_HEADER_SIZE: usize = 20;

/// Размер AUX-заголовка с меткой времени
pub const AUX_HEADER_SIZE_TIMESTAMPED: usize = 64;

/// Размер AUX-заголовка без метки времени
pub const AUX_HEADER_SIZE_COMPACT: usize = 56;

/// Размер поля CRC в конце AUX-заголовка
const AUX_CRC_SIZE: usize = 4;

pub trait SliceHeaderExt: Sized {
    /// Декодирует заголовок; `HeaderSizeMismatch` если длина не 20 байт.
    fn try_decode(blob: &[u8]) -> ZmqdResult<Self>;

    /// То же, но неподходящий блок просто отсутствует.
    fn decode(blob: &[u8]) -> Option<Self> {
        Self::try_decode(blob).ok()
    }

    fn encode(&self) -> [u8; SLICE_HEADER_SIZE];
}

pub trait AuxHeaderExt: Sized {
    /// Декодирует заголовок, ревизию выбирает по точному размеру блока.
    fn try_decode(blob: &[u8]) -> ZmqdResult<Self>;

    fn decode(blob: &[u8]) -> Option<Self> {
        Self::try_decode(blob).ok()
    }

    /// Кодирует все поля, включая хранимое значение `crc32`.
    fn encode(&self) -> Vec<u8>;

    /// CRC32 всех байтов заголовка, предшествующих полю CRC.
    fn compute_crc(&self) -> u32;

    /// Записывает в `crc32` вычисленное значение.
    fn seal(&mut self);

    /// Информационная проверка CRC: заголовок не отбрасывается при несовпадении.
    fn crc_matches(&self) -> bool {
        self.compute_crc() == self.stored_crc()
    }

    fn stored_crc(&self) -> u32;
}

impl SliceHeaderExt for SliceHeader {
    fn try_decode(blob: &[u8]) -> ZmqdResult<Self> {
        if blob.len() != SLICE_HEADER_SIZE {
            return Err(ZmqdError::HeaderSizeMismatch {
                header: "slice",
                expected: SLICE_HEADER_SIZE,
                found: blob.len(),
            });
        }

        let mut off = 0;

        Ok(SliceHeader {
            frame_number: read_u32_le(blob, &mut off),
            slot: read_u16_le(blob, &mut off),
            tx_port: read_u16_le(blob, &mut off),
            rx_port_index: read_u16_le(blob, &mut off),
            num_rx: read_u16_le(blob, &mut off),
            num_tx: read_u16_le(blob, &mut off),
            subcarrier_offset: read_u16_le(blob, &mut off),
            subcarrier_step: read_u16_le(blob, &mut off),
            length: read_u16_le(blob, &mut off),
        })
    }

    fn encode(&self) -> [u8; SLICE_HEADER_SIZE] {
        let mut buf = [0u8; SLICE_HEADER_SIZE];
        let mut off = 0;

        write_u32_le(&mut buf, &mut off, self.frame_number);
        for v in [
            self.slot,
            self.tx_port,
            self.rx_port_index,
            self.num_rx,
            self.num_tx,
            self.subcarrier_offset,
            self.subcarrier_step,
            self.length,
        ] {
            write_u16_le(&mut buf, &mut off, v);
        }

        buf
    }
}

impl AuxHeaderExt for AuxHeader {
    fn try_decode(blob: &[u8]) -> ZmqdResult<Self> {
        let revision =
            AuxRevision::from_size(blob.len()).ok_or(ZmqdError::HeaderSizeMismatch {
                header: "aux",
                expected: AUX_HEADER_SIZE_TIMESTAMPED,
                found: blob.len(),
            })?;

        let mut off = 0;
        let magic = read_u32_le(blob, &mut off);
        let version = read_u16_le(blob, &mut off);
        let size_bytes = read_u16_le(blob, &mut off);

        // Ревизии различаются только наличием u64 между size_bytes и кадром
        let timestamp_ns = match revision {
            AuxRevision::Timestamped => Some(read_u64_le(blob, &mut off)),
            AuxRevision::Compact => None,
        };

        Ok(AuxHeader {
            revision,
            magic,
            version,
            size_bytes,
            timestamp_ns,
            frame_number: read_u32_le(blob, &mut off),
            slot: read_u16_le(blob, &mut off),
            numerology: read_u16_le(blob, &mut off),
            rnti: read_u16_le(blob, &mut off),
            normalized_iq_requested: read_u8_at(blob, &mut off),
            positioning_requested: read_u8_at(blob, &mut off),
            epre_db: read_f32_le(blob, &mut off),
            rsrp_db: read_f32_le(blob, &mut off),
            noise_variance: read_f32_le(blob, &mut off),
            frob_norm: read_f32_le(blob, &mut off),
            frob_norm_sq: read_f32_le(blob, &mut off),
            num_rx: read_u16_le(blob, &mut off),
            num_tx: read_u16_le(blob, &mut off),
            lse_len: read_u16_le(blob, &mut off),
            comb: read_u16_le(blob, &mut off),
            subcarrier_offset: read_u16_le(blob, &mut off),
            scs_khz: read_u16_le(blob, &mut off),
            crc32: read_u32_le(blob, &mut off),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.revision.size()];
        let mut off = 0;

        write_u32_le(&mut buf, &mut off, self.magic);
        write_u16_le(&mut buf, &mut off, self.version);
        write_u16_le(&mut buf, &mut off, self.size_bytes);

        if self.revision == AuxRevision::Timestamped {
            write_u64_le(&mut buf, &mut off, self.timestamp_ns.unwrap_or(0));
        }

        write_u32_le(&mut buf, &mut off, self.frame_number);
        write_u16_le(&mut buf, &mut off, self.slot);
        write_u16_le(&mut buf, &mut off, self.numerology);
        write_u16_le(&mut buf, &mut off, self.rnti);
        write_u8_at(&mut buf, &mut off, self.normalized_iq_requested);
        write_u8_at(&mut buf, &mut off, self.positioning_requested);

        for v in [
            self.epre_db,
            self.rsrp_db,
            self.noise_variance,
            self.frob_norm,
            self.frob_norm_sq,
        ] {
            write_f32_le(&mut buf, &mut off, v);
        }

        for v in [
            self.num_rx,
            self.num_tx,
            self.lse_len,
            self.comb,
            self.subcarrier_offset,
            self.scs_khz,
        ] {
            write_u16_le(&mut buf, &mut off, v);
        }

        write_u32_le(&mut buf, &mut off, self.crc32);

        buf
    }

    fn compute_crc(&self) -> u32 {
        let buf = self.encode();
        let mut hasher = Hasher::new();
        hasher.update(&buf[..buf.len() - AUX_CRC_SIZE]);
        hasher.finalize()
    }

    fn seal(&mut self) {
        self.crc32 = self.compute_crc();
    }

    fn stored_crc(&self) -> u32 {
        self.crc32
    }
}
