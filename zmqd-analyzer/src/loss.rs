//! Подсчёт потерь по последовательности абсолютных слотов.

use serde::Serialize;
use zmqd_types::{ExpectedInterval, Numerology, NumerologySource};

use crate::error::{AnalyzerError, AnalyzerResult};

/// Наибольший интервал в слотах: один период SFN при mu = 4.
pub const MAX_INTERVAL_SLOTS: u64 = Numerology::FRAMES_PER_PERIOD * 160;

/// Наибольший интервал в миллисекундах: 1024 кадра по 10 мс.
pub const MAX_INTERVAL_MS: f64 = 10_240.0;

/// Счётчики потерь для одного прогона.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LossCounts {
    pub received: u64,
    pub expected: u64,
    pub lost: u64,
    /// Процент потерь (0.0–100.0)
    pub loss_rate_pct: f64,
}

/// Считает потери, проходя по наблюдениям с ожидаемым шагом `interval_slots`.
///
/// Каждое наблюдение `v` сначала «догоняет» ожидание: все ожидаемые слоты
/// строго до `v` засчитываются потерянными. Если наблюдение попало точно в
/// ожидаемый слот, следующее ожидание отсчитывается от `v`. Наблюдения между
/// ожидаемыми слотами просто принимаются.
pub fn compute_loss(
    interval_slots: u64,
    sequence: &[u64],
) -> LossCounts {
    let received = sequence.len() as u64;
    if received == 0 {
        return LossCounts::default();
    }

    let interval = interval_slots.max(1);
    let mut lost = 0u64;
    let mut next_expected: Option<u64> = None;

    for &v in sequence {
        let Some(mut next) = next_expected else {
            next_expected = Some(v.saturating_add(interval));
            continue;
        };

        // Насыщение у u64::MAX завершает цикл: next < v становится ложным
        while next < v {
            lost += 1;
            next = next.saturating_add(interval);
        }

        if next <= v {
            next = v.saturating_add(interval);
        }

        next_expected = Some(next);
    }

    let expected = received.saturating_add(lost);

    LossCounts {
        received,
        expected,
        lost,
        loss_rate_pct: lost as f64 / expected as f64 * 100.0,
    }
}

/// Переводит интервал в миллисекундах в слоты: `max(1, round(ms / slot_ms))`.
///
/// Округление банковское (половина к чётному).
pub fn interval_slots_from_ms(
    ms: f64,
    numerology: Numerology,
) -> u64 {
    let slots = (ms / numerology.slot_duration_ms()).round_ties_even();
    if slots < 1.0 {
        1
    } else {
        slots as u64
    }
}

/// Интервал в слотах для уже выбранной нумерологии.
pub fn resolve_interval_slots(
    interval: ExpectedInterval,
    numerology: Numerology,
) -> u64 {
    match interval {
        ExpectedInterval::Millis(ms) => interval_slots_from_ms(ms, numerology),
        ExpectedInterval::Slots(slots) => slots,
    }
}

/// Выбор нумерологии отчёта: AUX, затем предположение пользователя, затем 1.
pub fn resolve_numerology(
    aux: Option<Numerology>,
    assumed: Option<Numerology>,
) -> (Numerology, NumerologySource) {
    match (aux, assumed) {
        (Some(mu), _) => (mu, NumerologySource::Aux),
        (None, Some(mu)) => (mu, NumerologySource::Assumed),
        (None, None) => (Numerology::DEFAULT, NumerologySource::Default),
    }
}

/// Проверяет, что интервал пригоден для анализа.
pub fn validate_interval(interval: ExpectedInterval) -> AnalyzerResult<ExpectedInterval> {
    match interval {
        ExpectedInterval::Slots(0) => Err(AnalyzerError::config(
            "Expected interval must be at least 1 slot",
        )),
        ExpectedInterval::Slots(slots) if slots > MAX_INTERVAL_SLOTS => Err(AnalyzerError::config(
            format!("Expected interval {slots} slots exceeds {MAX_INTERVAL_SLOTS} slots"),
        )),
        ExpectedInterval::Millis(ms) if !ms.is_finite() || ms <= 0.0 => Err(
            AnalyzerError::config(format!("Expected interval must be a positive duration, got {ms} ms")),
        ),
        ExpectedInterval::Millis(ms) if ms > MAX_INTERVAL_MS => Err(AnalyzerError::config(
            format!("Expected interval {ms} ms exceeds {MAX_INTERVAL_MS} ms"),
        )),
        valid => Ok(valid),
    }
}
