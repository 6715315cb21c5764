use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde_json::json;
use zmqd_types::LossReport;

use crate::{error::AnalyzerResult, scan::ScanOutcome};

pub struct ReportExporter;

impl ReportExporter {
    /// Отчёт в виде JSON-строки.
    pub fn to_json(report: &LossReport) -> AnalyzerResult<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Экспорт отчёта в JSON-файл.
    pub fn export_json(
        report: &LossReport,
        path: &Path,
    ) -> AnalyzerResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    /// Отчёт вместе с диагностикой сканирования.
    pub fn export_session_report(
        report: &LossReport,
        outcome: &ScanOutcome,
        path: &Path,
    ) -> AnalyzerResult<()> {
        let first_slots: Vec<_> = outcome
            .observations
            .iter()
            .take(5)
            .map(|o| {
                json!({
                    "sfn": o.frame_number,
                    "slot": o.slot,
                    "abs": o.absolute,
                })
            })
            .collect();

        let session = json!({
            "report": report,
            "scan": {
                "records": outcome.records_seen,
                "records_without_slice": outcome.records_without_slice,
                "aux_headers": outcome.aux_headers_seen,
                "aux_crc_mismatches": outcome.aux_crc_mismatches,
                "numerology_changes": outcome.numerology_changes,
                "first_observations": first_slots,
            },
            "stream": {
                "v1_records": outcome.read_stats.v1_records,
                "v2_records": outcome.read_stats.v2_records,
                "bytes_processed": outcome.read_stats.bytes_processed,
                "truncated_bytes": outcome.read_stats.truncated_bytes,
            },
        });

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, &session)?;
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }
}
