//! Geodesy primitives: initial bearing and direct/inverse geodesic problems.
//!
//! All angles are in decimal degrees and all positions are `Coordinate`s
//! (latitude first). Distances handed to `destination` are kilometers to match
//! how the predictor expresses span offsets.

pub mod bearing;
pub mod destination;

pub use bearing::*;
pub use destination::*;
