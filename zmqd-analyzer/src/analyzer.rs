use std::{fs::File, io::Read, path::Path};

use log::{debug, info};
use zmqd_core::{FollowReader, RecordReader};
use zmqd_types::{ExpectedInterval, LossReport};

use crate::{
    config::AnalysisConfig,
    error::AnalyzerResult,
    loss::{compute_loss, resolve_interval_slots, resolve_numerology},
    scan::{scan_follow, scan_reader, ScanOutcome},
};

/// Анализатор потерь SRS.
///
/// Конфигурация проверяется при создании, поэтому ошибка в интервале
/// обнаруживается до того, как прочитан первый байт захвата. Нумерология
/// отчёта выбирается один раз, после полного прохода.
pub struct LossAnalyzer {
    config: AnalysisConfig,
    interval: ExpectedInterval,
}

impl LossAnalyzer {
    pub fn new(config: AnalysisConfig) -> AnalyzerResult<Self> {
        let interval = config.validate()?;
        debug!("Loss analyzer configured: interval {interval}");

        Ok(Self { config, interval })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Сканирует источник до конца потока.
    pub fn scan<R: Read>(
        &self,
        source: R,
    ) -> AnalyzerResult<ScanOutcome> {
        let mut reader = RecordReader::with_chunk_size(source, self.config.read_chunk_size);
        Ok(scan_reader(&mut reader, &self.config)?)
    }

    /// Строит отчёт по результату сканирования.
    pub fn report(
        &self,
        outcome: &ScanOutcome,
    ) -> LossReport {
        let (numerology, numerology_source) =
            resolve_numerology(outcome.aux_numerology, self.config.assumed_numerology);
        let interval_slots = resolve_interval_slots(self.interval, numerology);
        let counts = compute_loss(interval_slots, &outcome.absolute_slots());

        LossReport {
            numerology,
            numerology_source,
            slot_duration_ms: numerology.slot_duration_ms(),
            slots_per_frame: numerology.slots_per_frame(),
            observed_median_delta: outcome.median_delta(),
            interval: self.interval,
            interval_slots,
            received: counts.received,
            expected: counts.expected,
            lost: counts.lost,
            loss_rate_pct: counts.loss_rate_pct,
        }
    }

    pub fn analyze_reader<R: Read>(
        &self,
        source: R,
    ) -> AnalyzerResult<LossReport> {
        let outcome = self.scan(source)?;
        let report = self.report(&outcome);

        info!(
            "Loss: {}/{} lost ({:.3}%), mu={} ({})",
            report.lost,
            report.expected,
            report.loss_rate_pct,
            report.numerology,
            report.numerology_source
        );

        Ok(report)
    }

    /// Открывает файл захвата, анализирует и закрывает его.
    pub fn analyze_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> AnalyzerResult<LossReport> {
        let path = path.as_ref();
        info!("Analyzing {}", path.display());

        let file = File::open(path)?;
        self.analyze_reader(file)
    }

    /// Анализирует растущий захват; возвращается после остановки читателя.
    pub fn analyze_follow<R: Read>(
        &self,
        reader: &mut FollowReader<R>,
    ) -> AnalyzerResult<LossReport> {
        let outcome = scan_follow(reader, &self.config)?;
        Ok(self.report(&outcome))
    }
}
