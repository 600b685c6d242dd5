//! Domain types shared by the predictor, topology and IO layers.
//!
//! This module defines:
//!
//! - geographic primitives (`Coordinate`)
//! - network reference data (`Pole`, `Olt`, `SegmentRow`, `SegmentPoleEntry`)
//! - prediction outputs (`CutTrace`)

pub mod types;

pub use types::*;
