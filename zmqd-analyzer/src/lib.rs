//! Анализ потерь SRS по захватам ZMQD
//!
//! Восстанавливает монотонный абсолютный слот из циклической пары
//! (SFN, slot) и считает ожидаемые, принятые и потерянные передачи при
//! заданном интервале SRS.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use zmqd_analyzer::{AnalysisConfig, LossAnalyzer};
//!
//! let analyzer = LossAnalyzer::new(AnalysisConfig::interval_ms(5.0))?;
//! let report = analyzer.analyze_path("capture.dat")?;
//! println!("{report}");
//! # Ok::<(), zmqd_analyzer::AnalyzerError>(())
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod export;
pub mod loss;
pub mod scan;
pub mod tracker;

pub use analyzer::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use loss::*;
pub use scan::*;
pub use tracker::*;
