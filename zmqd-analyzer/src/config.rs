use zmqd_core::DEFAULT_READ_CHUNK;
use zmqd_types::{ExpectedInterval, Numerology};

use crate::{
    error::{AnalyzerError, AnalyzerResult},
    loss::validate_interval,
};

/// Индекс части с заголовком среза по умолчанию.
pub const DEFAULT_SLICE_PART_INDEX: usize = 0;

/// Индекс части с AUX-заголовком по умолчанию.
pub const DEFAULT_AUX_PART_INDEX: usize = 8;

/// Полная конфигурация прогона анализа потерь.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Ожидаемый интервал SRS (обязателен)
    pub interval: Option<ExpectedInterval>,
    /// Нумерология, если в захвате нет AUX-заголовков
    pub assumed_numerology: Option<Numerology>,
    /// Часть записи с заголовком среза
    pub slice_part_index: usize,
    /// Часть записи с AUX-заголовком
    pub aux_part_index: usize,
    /// Размер порции чтения из источника (байт)
    pub read_chunk_size: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl AnalysisConfig {
    /// Конфигурация с интервалом в миллисекундах.
    pub fn interval_ms(ms: f64) -> Self {
        Self {
            interval: Some(ExpectedInterval::Millis(ms)),
            ..Self::default()
        }
    }

    /// Конфигурация с интервалом в слотах.
    pub fn interval_slots(slots: u64) -> Self {
        Self {
            interval: Some(ExpectedInterval::Slots(slots)),
            ..Self::default()
        }
    }

    pub fn with_assumed_numerology(
        mut self,
        numerology: Numerology,
    ) -> Self {
        self.assumed_numerology = Some(numerology);
        self
    }

    pub fn with_part_indices(
        mut self,
        slice_part_index: usize,
        aux_part_index: usize,
    ) -> Self {
        self.slice_part_index = slice_part_index;
        self.aux_part_index = aux_part_index;
        self
    }

    /// Проверяет конфигурацию и возвращает пригодный интервал.
    pub fn validate(&self) -> AnalyzerResult<ExpectedInterval> {
        let interval = self.interval.ok_or_else(|| {
            AnalyzerError::config("Expected interval is required (milliseconds or slots)")
        })?;

        if self.read_chunk_size == 0 {
            return Err(AnalyzerError::config("Read chunk size must be non-zero"));
        }

        validate_interval(interval)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для AnalysisConfig
////////////////////////////////////////////////////////////////////////////////

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            interval: None,
            assumed_numerology: None,
            slice_part_index: DEFAULT_SLICE_PART_INDEX,
            aux_part_index: DEFAULT_AUX_PART_INDEX,
            read_chunk_size: DEFAULT_READ_CHUNK,
        }
    }
}

/// Парсит строку интервала SRS.
///
/// Поддерживает суффиксы: `ms` (миллисекунды), `slot`/`slots`
/// (регистронезависимо). Число без суффикса считается слотами.
///
/// # Примеры
/// ```
/// use zmqd_analyzer::config::parse_interval;
/// use zmqd_types::ExpectedInterval;
/// assert_eq!(parse_interval("5ms").unwrap(), ExpectedInterval::Millis(5.0));
/// assert_eq!(parse_interval("0.5 ms").unwrap(), ExpectedInterval::Millis(0.5));
/// assert_eq!(parse_interval("10").unwrap(), ExpectedInterval::Slots(10));
/// assert_eq!(parse_interval("10slots").unwrap(), ExpectedInterval::Slots(10));
/// ```
pub fn parse_interval(s: &str) -> Result<ExpectedInterval, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    if let Some(v) = lower.strip_suffix("ms") {
        let ms: f64 = v
            .trim()
            .parse()
            .map_err(|e| format!("Invalid interval value '{}': {e}", v.trim()))?;
        return Ok(ExpectedInterval::Millis(ms));
    }

    // Без суффикса — число слотов
    let num_str = lower
        .strip_suffix("slots")
        .or_else(|| lower.strip_suffix("slot"))
        .unwrap_or(lower.as_str())
        .trim();

    num_str
        .parse::<u64>()
        .map(ExpectedInterval::Slots)
        .map_err(|e| format!("Invalid interval '{s}': {e}"))
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
