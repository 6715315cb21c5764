pub mod aux_header;
pub mod error;
pub mod numerology;
pub mod record;
pub mod report;
pub mod slice_header;

pub use aux_header::*;
pub use error::*;
pub use numerology::*;
pub use record::*;
pub use report::*;
pub use slice_header::*;
