//! Data models

pub mod classification;
pub mod envelope;
pub mod record;

pub use classification::*;
pub use envelope::*;
pub use record::*;
