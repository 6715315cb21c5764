/// Ревизия AUX-заголовка (Part8).
///
/// В захватах встречаются две несовместимые раскладки одного и того же
/// заголовка. Ревизия определяется только по точному размеру блока.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxRevision {
    /// С 64-битной меткой времени: 64 байта
    Timestamped,
    /// Без метки времени, сразу кадр/слот: 56 байт
    Compact,
}

/// Вспомогательный заголовок с нумерологией и метриками качества сигнала.
///
/// Для анализа потерь нужен только `numerology`, остальные поля
/// передаются как есть.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxHeader {
    pub revision: AuxRevision,
    pub magic: u32,
    pub version: u16,
    /// Размер заголовка, как его записал источник
    pub size_bytes: u16,
    /// Только в ревизии [`AuxRevision::Timestamped`]
    pub timestamp_ns: Option<u64>,
    pub frame_number: u32,
    pub slot: u16,
    /// Нумерология mu (0–4)
    pub numerology: u16,
    pub rnti: u16,
    pub normalized_iq_requested: u8,
    pub positioning_requested: u8,
    /// EPRE, дБ
    pub epre_db: f32,
    /// RSRP, дБ
    pub rsrp_db: f32,
    pub noise_variance: f32,
    /// Норма Фробениуса матрицы канала
    pub frob_norm: f32,
    pub frob_norm_sq: f32,
    pub num_rx: u16,
    pub num_tx: u16,
    pub lse_len: u16,
    pub comb: u16,
    pub subcarrier_offset: u16,
    /// Разнос поднесущих, кГц
    pub scs_khz: u16,
    /// CRC32 заголовка (последнее поле)
    pub crc32: u32,
}

impl AuxRevision {
    /// Размер блока данной ревизии в байтах.
    pub fn size(&self) -> usize {
        match self {
            AuxRevision::Timestamped => 64,
            AuxRevision::Compact => 56,
        }
    }

    pub fn from_size(len: usize) -> Option<Self> {
        match len {
            64 => Some(AuxRevision::Timestamped),
            56 => Some(AuxRevision::Compact),
            _ => None,
        }
    }
}

impl AuxHeader {
    /// Пустой заголовок заданной ревизии (все поля нулевые).
    pub fn new(revision: AuxRevision) -> Self {
        AuxHeader {
            revision,
            magic: 0,
            version: 1,
            size_bytes: revision.size() as u16,
            timestamp_ns: match revision {
                AuxRevision::Timestamped => Some(0),
                AuxRevision::Compact => None,
            },
            frame_number: 0,
            slot: 0,
            numerology: 0,
            rnti: 0,
            normalized_iq_requested: 0,
            positioning_requested: 0,
            epre_db: 0.0,
            rsrp_db: 0.0,
            noise_variance: 0.0,
            frob_norm: 0.0,
            frob_norm_sq: 0.0,
            num_rx: 0,
            num_tx: 0,
            lse_len: 0,
            comb: 0,
            subcarrier_offset: 0,
            scs_khz: 0,
            crc32: 0,
        }
    }
}
