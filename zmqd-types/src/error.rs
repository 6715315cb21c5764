use thiserror::Error;

/// Результат для операций с контейнером ZMQD
pub type ZmqdResult<T> = std::result::Result<T, ZmqdError>;

/// Причина, по которой поток признан повреждённым.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// Первые 4 байта записи не совпали с `ZMQD`
    #[error("bad magic {0:02x?}")]
    BadMagic([u8; 4]),

    /// Версия записи не 1 и не 2
    #[error("unknown version {0}")]
    UnknownVersion(u16),
}

/// Типы ошибок формата ZMQD.
#[derive(Debug, Error)]
pub enum ZmqdError {
    /// Поток повреждён: чтение прекращается, восстановление не выполняется
    #[error("Malformed stream at offset {offset}: {reason}")]
    MalformedStream { offset: u64, reason: MalformedReason },

    /// Размер части не совпал с фиксированным размером заголовка
    #[error("{header} header size mismatch: expected {expected}, found {found}")]
    HeaderSizeMismatch {
        header: &'static str,
        expected: usize,
        found: usize,
    },

    /// Нарушение ограничений формата при записи
    #[error("Format violation: {0}")]
    FormatViolation(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZmqdError {
    pub fn bad_magic(
        offset: u64,
        found: [u8; 4],
    ) -> Self {
        Self::MalformedStream {
            offset,
            reason: MalformedReason::BadMagic(found),
        }
    }

    pub fn unknown_version(
        offset: u64,
        version: u16,
    ) -> Self {
        Self::MalformedStream {
            offset,
            reason: MalformedReason::UnknownVersion(version),
        }
    }

    pub fn format_violation<S: Into<String>>(s: S) -> Self {
        Self::FormatViolation(s.into())
    }

    /// `true` для ошибок, после которых чтение потока невозможно.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedStream { .. })
    }
}
