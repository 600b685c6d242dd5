//! Input/output helpers.
//!
//! - opening local or remote table sources (`source`)
//! - CSV ingest + validation (`ingest`)
//! - prediction exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;
pub mod source;

pub use export::*;
pub use ingest::*;
pub use source::*;
