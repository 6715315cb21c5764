use serde::Serialize;

use crate::Numerology;

/// Откуда взята нумерология отчёта.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumerologySource {
    /// Из AUX-заголовков, встреченных при сканировании
    Aux,
    /// Задана пользователем как предположение
    Assumed,
    /// Ни того, ни другого: mu = 1
    Default,
}

/// Ожидаемый интервал передачи SRS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedInterval {
    /// В миллисекундах, переводится в слоты по нумерологии
    Millis(f64),
    /// Сразу в слотах
    Slots(u64),
}

/// Итоговый отчёт о потерях. Создаётся один раз на прогон анализа.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossReport {
    pub numerology: Numerology,
    pub numerology_source: NumerologySource,
    pub slot_duration_ms: f64,
    pub slots_per_frame: u32,
    /// Медиана положительных приращений абсолютного слота
    pub observed_median_delta: f64,
    /// Интервал в том виде, в каком его передали
    pub interval: ExpectedInterval,
    pub interval_slots: u64,
    pub received: u64,
    pub expected: u64,
    pub lost: u64,
    /// Процент потерь (0.0–100.0)
    pub loss_rate_pct: f64,
}

impl std::fmt::Display for NumerologySource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            NumerologySource::Aux => write!(f, "aux"),
            NumerologySource::Assumed => write!(f, "assumed"),
            NumerologySource::Default => write!(f, "default"),
        }
    }
}

impl std::fmt::Display for ExpectedInterval {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ExpectedInterval::Millis(ms) => write!(f, "{ms} ms"),
            ExpectedInterval::Slots(slots) => write!(f, "{slots} slots"),
        }
    }
}

impl std::fmt::Display for LossReport {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "  Numerology      : {} ({})",
            self.numerology, self.numerology_source
        )?;
        writeln!(f, "  Slot duration   : {:.6} ms", self.slot_duration_ms)?;
        writeln!(f, "  Slots per frame : {}", self.slots_per_frame)?;
        writeln!(f, "  Median Δslot    : {}", self.observed_median_delta)?;
        writeln!(f, "  Interval (in)   : {}", self.interval)?;
        writeln!(f, "  Interval (slots): {}", self.interval_slots)?;
        writeln!(f, "  Received        : {}", self.received)?;
        writeln!(f, "  Expected        : {}", self.expected)?;
        writeln!(f, "  Lost            : {}", self.lost)?;
        writeln!(f, "  Loss rate       : {:.3}%", self.loss_rate_pct)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
