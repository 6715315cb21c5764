//! Восстановление монотонного абсолютного слота из циклической пары
//! (SFN, slot).
//!
//! SFN повторяется каждые 1024 кадра, поэтому абсолютный индекс строится
//! относительно предыдущего значения: шаг вперёд берётся по модулю периода
//! `1024 * slots_per_frame`. Пропуск больше целого периода между соседними
//! наблюдениями неотличим от меньшего пропуска — это предел метода.

use log::debug;
use zmqd_types::Numerology;

/// Переводит (sfn, slot) в абсолютный слот, продолжая `prev`.
///
/// Без предыдущего значения возвращает позицию внутри периода.
pub fn advance_absolute_slot(
    prev: Option<u64>,
    frame_number: u32,
    slot: u16,
    slots_per_frame: u32,
) -> u64 {
    let spf = slots_per_frame as u64;
    let period = Numerology::FRAMES_PER_PERIOD * spf;
    let current_mod = (frame_number as u64 % Numerology::FRAMES_PER_PERIOD) * spf + slot as u64 % spf;

    match prev {
        None => current_mod,
        Some(prev) => {
            let prev_mod = prev % period;
            // (current - prev) mod period, всегда в [0, period)
            let forward = (current_mod + period - prev_mod) % period;
            prev + forward
        }
    }
}

/// Свёртка потока пар (sfn, slot) в абсолютные слоты.
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    numerology: Numerology,
    previous: Option<u64>,
    deltas: Vec<u64>,
}

impl SequenceTracker {
    pub fn new(numerology: Numerology) -> Self {
        Self {
            numerology,
            previous: None,
            deltas: Vec::new(),
        }
    }

    /// Меняет нумерологию для всех последующих шагов.
    ///
    /// Уже выданные значения не пересчитываются. Возвращает `true`, если
    /// нумерология действительно изменилась.
    pub fn set_numerology(
        &mut self,
        numerology: Numerology,
    ) -> bool {
        if numerology == self.numerology {
            return false;
        }

        debug!(
            "Tracker numerology {} -> {} (slots/frame {} -> {})",
            self.numerology,
            numerology,
            self.numerology.slots_per_frame(),
            numerology.slots_per_frame()
        );
        self.numerology = numerology;
        true
    }

    /// Продвигает трекер на одно наблюдение, возвращает абсолютный слот.
    pub fn advance(
        &mut self,
        frame_number: u32,
        slot: u16,
    ) -> u64 {
        let abs = advance_absolute_slot(
            self.previous,
            frame_number,
            slot,
            self.numerology.slots_per_frame(),
        );

        // Дубликаты в том же слоте (другие порты) дают нулевой шаг и не учитываются
        if let Some(prev) = self.previous {
            if abs > prev {
                self.deltas.push(abs - prev);
            }
        }

        self.previous = Some(abs);
        abs
    }

    pub fn numerology(&self) -> Numerology {
        self.numerology
    }

    pub fn previous(&self) -> Option<u64> {
        self.previous
    }

    /// Положительные приращения между соседними наблюдениями.
    pub fn deltas(&self) -> &[u64] {
        &self.deltas
    }

    pub fn median_delta(&self) -> f64 {
        median(&self.deltas)
    }

    pub fn into_deltas(self) -> Vec<u64> {
        self.deltas
    }
}

/// Медиана; для чётного числа элементов — среднее двух средних. Пусто → 0.
pub fn median(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::*;

    fn mu(v: u16) -> Numerology {
        Numerology::new(v).unwrap()
    }

    #[test]
    fn test_first_observation_is_position_in_period() {
        assert_eq!(advance_absolute_slot(None, 3, 5, 20), 65);
        // Номера вне диапазона сворачиваются по модулю
        assert_eq!(advance_absolute_slot(None, 1024 + 3, 25, 20), 65);
    }

    #[test]
    fn test_frame_wraparound_keeps_increasing() {
        let mut tracker = SequenceTracker::new(mu(1));

        let a = tracker.advance(1022, 0);
        let b = tracker.advance(1023, 0);
        let c = tracker.advance(0, 0);
        let d = tracker.advance(1, 0);

        assert_eq!(a, 1022 * 20);
        assert_eq!(b - a, 20);
        assert_eq!(c - b, 20, "1023 -> 0 is one frame forward, not a drop");
        assert_eq!(d - c, 20);
        assert_eq!(tracker.deltas(), &[20, 20, 20]);
    }

    #[test]
    fn test_duplicates_not_recorded_as_deltas() {
        let mut tracker = SequenceTracker::new(mu(1));

        tracker.advance(5, 3);
        let again = tracker.advance(5, 3);
        tracker.advance(5, 13);

        assert_eq!(again, 5 * 20 + 3);
        assert_eq!(tracker.deltas(), &[10]);
    }

    #[test]
    fn test_out_of_order_becomes_forward_jump() {
        // Шаг назад внутри периода трактуется как почти полный оборот вперёд
        let mut tracker = SequenceTracker::new(mu(0));

        let a = tracker.advance(10, 5);
        let b = tracker.advance(10, 4);

        assert_eq!(b - a, 1024 * 10 - 1);
    }

    #[test]
    fn test_numerology_change_applies_forward_only() {
        let mut tracker = SequenceTracker::new(mu(1));

        let a = tracker.advance(0, 10);
        assert_eq!(a, 10);

        assert!(tracker.set_numerology(mu(2)));
        assert!(!tracker.set_numerology(mu(2)));

        // Теперь 40 слотов на кадр: (1, 0) -> 40, шаг от 10 — 30
        let b = tracker.advance(1, 0);
        assert_eq!(b, 40);
        assert_eq!(tracker.numerology(), mu(2));
    }

    #[test]
    fn test_non_decreasing_without_full_period_skips() {
        let mut rng = SmallRng::seed_from_u64(0x5253);

        for m in 0..=4u16 {
            let numerology = mu(m);
            let spf = numerology.slots_per_frame() as u64;
            let period = numerology.wrap_period();

            let mut tracker = SequenceTracker::new(numerology);
            let mut truth: u64 = rng.gen_range(0..period);
            let mut last = None;

            for _ in 0..5_000 {
                let frame = ((truth / spf) % 1024) as u32;
                let slot = (truth % spf) as u16;
                let abs = tracker.advance(frame, slot);

                if let Some(prev) = last {
                    assert!(abs >= prev, "mu={m}: {abs} < {prev}");
                }
                assert_eq!(abs % period, truth % period);
                last = Some(abs);

                truth += rng.gen_range(0..period);
            }
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[7]), 7.0);
        assert_eq!(median(&[10, 30, 20]), 20.0);
        assert_eq!(median(&[10, 20, 30, 40]), 25.0);
    }
}
