use serde::Serialize;

/// Нумерология NR (mu).
///
/// Определяет длительность слота `1 / 2^mu` мс и число слотов в 10-мс кадре
/// `10 * 2^mu`. Допустимые значения 0–4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Numerology(u8);

impl Numerology {
    /// Максимальная поддерживаемая нумерология.
    pub const MAX: u8 = 4;

    /// Нумерология по умолчанию, если ни AUX, ни пользователь её не задали.
    pub const DEFAULT: Numerology = Numerology(1);

    /// Кадров в одном периоде нумерации SFN.
    pub const FRAMES_PER_PERIOD: u64 = 1024;

    pub fn new(mu: u16) -> Option<Self> {
        if mu <= Self::MAX as u16 {
            Some(Numerology(mu as u8))
        } else {
            None
        }
    }

    pub fn mu(&self) -> u8 {
        self.0
    }

    /// Слотов в 10-мс кадре: `10 * 2^mu`.
    pub fn slots_per_frame(&self) -> u32 {
        10 << self.0
    }

    /// Длительность слота в миллисекундах: `1 / 2^mu`.
    pub fn slot_duration_ms(&self) -> f64 {
        1.0 / (1u32 << self.0) as f64
    }

    /// Период восстановления абсолютного слота: `1024 * slots_per_frame`.
    pub fn wrap_period(&self) -> u64 {
        Self::FRAMES_PER_PERIOD * self.slots_per_frame() as u64
    }
}

impl Default for Numerology {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Numerology {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Numerology {
    type Err = String;

    /// Принимает `1`, `mu1` или `mu=1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .strip_prefix("mu")
            .map(|v| v.trim_start_matches('='))
            .unwrap_or(lower.as_str())
            .trim();

        let mu: u16 = digits
            .parse()
            .map_err(|e| format!("Invalid numerology '{s}': {e}"))?;

        Numerology::new(mu).ok_or_else(|| {
            format!(
                "Numerology {mu} out of range. Use: 0..={}",
                Numerology::MAX
            )
        })
    }
}
