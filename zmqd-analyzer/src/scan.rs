//! Однопроходное сканирование захвата: записи → заголовки → абсолютные слоты.

use std::io::Read;

use log::{debug, info, warn};
use zmqd_core::{AuxHeaderExt, FollowReader, ReadStats, RecordReader, SliceHeaderExt};
use zmqd_types::{AuxHeader, Numerology, Record, SliceHeader, ZmqdResult};

use crate::{
    config::AnalysisConfig,
    tracker::{median, SequenceTracker},
};

/// Сколько первых наблюдений выводить в debug-лог.
const LOGGED_OBSERVATIONS: usize = 5;

/// Одно наблюдение среза: пара (SFN, slot) и восстановленный абсолютный слот.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotObservation {
    pub frame_number: u32,
    pub slot: u16,
    pub absolute: u64,
    pub recv_time_ns: u64,
}

/// Результат сканирования, вход для подсчёта потерь.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Последняя валидная нумерология из AUX (None — AUX не встречался)
    pub aux_numerology: Option<Numerology>,
    /// Наблюдения в порядке записей
    pub observations: Vec<SlotObservation>,
    /// Положительные приращения абсолютного слота
    pub deltas: Vec<u64>,
    pub read_stats: ReadStats,
    pub records_seen: u64,
    /// Записи без декодируемого заголовка среза (пропущены)
    pub records_without_slice: u64,
    pub aux_headers_seen: u64,
    /// AUX-заголовки с несовпавшей CRC (информационно)
    pub aux_crc_mismatches: u64,
    /// Сколько раз AUX сменил нумерологию трекера
    pub numerology_changes: u64,
}

impl ScanOutcome {
    pub fn absolute_slots(&self) -> Vec<u64> {
        self.observations.iter().map(|o| o.absolute).collect()
    }

    pub fn median_delta(&self) -> f64 {
        median(&self.deltas)
    }
}

/// Пошаговый сканер. Принимает записи по одной, поэтому подходит и для
/// [`RecordReader`], и для [`FollowReader`].
pub struct Scanner {
    tracker: SequenceTracker,
    slice_part_index: usize,
    aux_part_index: usize,
    outcome: ScanOutcome,
}

impl Scanner {
    /// До первого AUX шаг считается с mu = 1. Предполагаемая нумерология
    /// из конфигурации на шаг не влияет: она участвует только в отчёте.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            tracker: SequenceTracker::new(Numerology::DEFAULT),
            slice_part_index: config.slice_part_index,
            aux_part_index: config.aux_part_index,
            outcome: ScanOutcome::default(),
        }
    }

    pub fn observe(
        &mut self,
        record: &Record,
    ) {
        self.outcome.records_seen += 1;

        // Запись без заголовка среза пропускается целиком, вместе с её AUX
        let Some(hdr) = record.part(self.slice_part_index).and_then(SliceHeader::decode) else {
            self.outcome.records_without_slice += 1;
            return;
        };

        // AUX действует уже на шаг этой же записи
        if let Some(aux) = record.part(self.aux_part_index).and_then(AuxHeader::decode) {
            self.harvest_aux(&aux);
        }

        let (frame_number, slot) = hdr.sequence_pair();
        let absolute = self.tracker.advance(frame_number, slot);

        if self.outcome.observations.len() < LOGGED_OBSERVATIONS {
            debug!("sfn={frame_number:4} slot={slot:3} -> abs={absolute}");
        }

        self.outcome.observations.push(SlotObservation {
            frame_number,
            slot,
            absolute,
            recv_time_ns: record.recv_time_ns,
        });
    }

    fn harvest_aux(
        &mut self,
        aux: &AuxHeader,
    ) {
        self.outcome.aux_headers_seen += 1;

        if !aux.crc_matches() {
            self.outcome.aux_crc_mismatches += 1;
            debug!(
                "AUX CRC mismatch at sfn={} slot={} (stored {:#010x})",
                aux.frame_number,
                aux.slot,
                aux.stored_crc()
            );
        }

        let Some(numerology) = Numerology::new(aux.numerology) else {
            warn!(
                "Ignoring AUX header with out-of-range numerology {} (sfn={} slot={})",
                aux.numerology, aux.frame_number, aux.slot
            );
            return;
        };

        self.outcome.aux_numerology = Some(numerology);

        if self.tracker.set_numerology(numerology) {
            self.outcome.numerology_changes += 1;
            info!(
                "Numerology from AUX: mu={} ({} slots/frame) after {} observations",
                numerology,
                numerology.slots_per_frame(),
                self.outcome.observations.len()
            );
        }
    }

    /// Текущая нумерология шага трекера.
    pub fn stepping_numerology(&self) -> Numerology {
        self.tracker.numerology()
    }

    pub fn observations(&self) -> &[SlotObservation] {
        &self.outcome.observations
    }

    pub fn finish(
        self,
        read_stats: ReadStats,
    ) -> ScanOutcome {
        let mut outcome = self.outcome;
        outcome.deltas = self.tracker.into_deltas();
        outcome.read_stats = read_stats;

        info!(
            "Scan complete: {} records, {} observations, {} without slice header, {} AUX headers",
            outcome.records_seen,
            outcome.observations.len(),
            outcome.records_without_slice,
            outcome.aux_headers_seen
        );
        if outcome.read_stats.truncated_bytes > 0 {
            info!(
                "Capture ends with {} bytes of a truncated record",
                outcome.read_stats.truncated_bytes
            );
        }

        outcome
    }
}

/// Сканирует весь поток до конца. Повреждённый поток прерывает скан.
pub fn scan_reader<R: Read>(
    reader: &mut RecordReader<R>,
    config: &AnalysisConfig,
) -> ZmqdResult<ScanOutcome> {
    let mut scanner = Scanner::new(config);

    while let Some(record) = reader.next_record() {
        scanner.observe(&record?);
    }

    Ok(scanner.finish(reader.stats().clone()))
}

/// Сканирует растущий источник до остановки по флагу.
pub fn scan_follow<R: Read>(
    reader: &mut FollowReader<R>,
    config: &AnalysisConfig,
) -> ZmqdResult<ScanOutcome> {
    let mut scanner = Scanner::new(config);

    while let Some(record) = reader.next_record() {
        scanner.observe(&record?);
    }

    Ok(scanner.finish(reader.stats().clone()))
}
