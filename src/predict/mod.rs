//! Cut-location prediction.
//!
//! Responsibilities:
//!
//! - calibration constants (overread correction, periodic slack loops)
//! - read-only pole coordinate lookup
//! - walking a segment's pole chain to find the span holding the cut
//! - evaluating many readings in parallel

pub mod batch;
pub mod calibration;
pub mod cut;
pub mod lookup;

pub use batch::*;
pub use calibration::*;
pub use cut::*;
pub use lookup::*;

/// Failures of a single prediction.
///
/// These are pure-computation failures: retrying with the same input always
/// fails the same way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    /// The pole chain is empty or cannot be traversed.
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),
    /// A pole referenced by the chain is missing from the coordinate table.
    #[error("Pole '{pole_id}' has no coordinates in the poles table.")]
    Lookup { pole_id: String },
    /// The corrected reading lies beyond the end of the chain.
    #[error(
        "OTDR distance exceeds total distance of the segment \
         (adjusted reading {adjusted_m:.2} m, chain length {chain_m:.2} m)."
    )]
    OutOfRange { adjusted_m: f64, chain_m: f64 },
    /// A numeric input or calibration value is outside its domain.
    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
