use thiserror::Error;
use zmqd_types::ZmqdError;

pub type AnalyzerResult<T> = std::result::Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Некорректная конфигурация анализа (обнаруживается до сканирования)
    #[error("Config error: {0}")]
    Config(String),

    /// Ошибка формата ZMQD (повреждённый поток)
    #[error("ZMQD error: {0}")]
    Format(#[from] ZmqdError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка экспорта отчёта
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn config<S: Into<String>>(s: S) -> Self {
        Self::Config(s.into())
    }
}
