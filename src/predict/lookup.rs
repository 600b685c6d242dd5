//! Read-only pole coordinate lookup.

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::domain::Coordinate;

/// Maps a pole identifier to its coordinates.
///
/// The predictor only ever reads through this trait, so it does not care
/// whether poles came from a CSV file, a URL or a test fixture.
pub trait PoleLookup {
    fn coordinates(&self, pole_id: &str) -> Option<Coordinate>;
}

impl<S: BuildHasher> PoleLookup for HashMap<String, Coordinate, S> {
    fn coordinates(&self, pole_id: &str) -> Option<Coordinate> {
        self.get(pole_id).copied()
    }
}

impl<T: PoleLookup + ?Sized> PoleLookup for &T {
    fn coordinates(&self, pole_id: &str) -> Option<Coordinate> {
        (**self).coordinates(pole_id)
    }
}
