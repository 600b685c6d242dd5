//! Reporting utilities: map links and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::Coordinate;

/// Google Maps link centered on `location`.
pub fn maps_url(location: Coordinate) -> String {
    format!(
        "https://www.google.com/maps?q={:.6},{:.6}",
        location.latitude, location.longitude
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_url_uses_six_decimals() {
        assert_eq!(
            maps_url(Coordinate::new(-6.9147449, 107.60981)),
            "https://www.google.com/maps?q=-6.914745,107.609810"
        );
    }
}
