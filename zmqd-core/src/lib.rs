//! Библиотека формата контейнера ZMQD
//!
//! Эталонная реализация записи и чтения `.dat` файлов с multipart-сообщениями
//! SRS (оценки канала по срезам), а также кодеки заголовков среза и AUX.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use std::fs::File;
//!
//! use zmqd_core::{RecordReader, SliceHeaderExt};
//! use zmqd_types::SliceHeader;
//!
//! let reader = RecordReader::new(File::open("capture.dat")?);
//! for record in reader {
//!     let record = record?;
//!     if let Some(hdr) = record.part(0).and_then(SliceHeader::decode) {
//!         println!("sfn={} slot={}", hdr.frame_number, hdr.slot);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod follow;
pub mod format;
pub mod headers;
pub mod serialization;

pub use binary::*;
pub use follow::*;
pub use format::*;
pub use headers::*;
pub use serialization::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
