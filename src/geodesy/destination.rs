//! Direct and inverse geodesic problems on the WGS84 ellipsoid.
//!
//! Both delegate to `geo`'s `Geodesic` metric space (Karney's algorithm).
//! `geo` points are `(x = longitude, y = latitude)`, so conversions go through
//! the two helpers below rather than being spelled out at call sites.

use geo::{Destination, Distance, Geodesic, Point};

use crate::domain::Coordinate;

/// Project `start` by `distance_km` along `bearing_deg`.
///
/// A zero distance returns `start` unchanged (bit-for-bit).
pub fn destination(start: Coordinate, bearing_deg: f64, distance_km: f64) -> Coordinate {
    if distance_km == 0.0 {
        return start;
    }
    let end = Geodesic::destination(to_point(start), bearing_deg, distance_km * 1000.0);
    from_point(end)
}

/// Ellipsoidal distance between two coordinates (meters).
pub fn geodesic_distance(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    Geodesic::distance(to_point(a), to_point(b))
}

fn to_point(c: Coordinate) -> Point<f64> {
    Point::new(c.longitude, c.latitude)
}

fn from_point(p: Point<f64>) -> Coordinate {
    Coordinate::new(p.y(), p.x())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::initial_bearing;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_distance_is_identity() {
        let p = Coordinate::new(10.123456789, 100.987654321);
        for bearing in [0.0, 45.0, 90.0, 181.5, 359.999] {
            assert_eq!(destination(p, bearing, 0.0), p);
        }
    }

    #[test]
    fn due_east_along_equator() {
        let start = Coordinate::new(0.0, 0.0);
        let end = destination(start, 90.0, 55.0);
        assert_abs_diff_eq!(end.latitude, 0.0, epsilon = 1e-9);
        assert!(end.longitude > 0.49 && end.longitude < 0.50, "lon = {}", end.longitude);
        assert_abs_diff_eq!(geodesic_distance(start, end), 55_000.0, epsilon = 1e-3);
    }

    #[test]
    fn destination_preserves_bearing_and_distance() {
        let start = Coordinate::new(-6.9147, 107.6098);
        let end = destination(start, 37.0, 0.75);
        assert_abs_diff_eq!(geodesic_distance(start, end), 750.0, epsilon = 1e-3);
        // Spherical bearing vs ellipsoidal azimuth differ by a fraction of a degree.
        assert_abs_diff_eq!(initial_bearing(start, end), 37.0, epsilon = 0.25);
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = geodesic_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        // WGS84 equatorial degree.
        assert_abs_diff_eq!(d, 111_319.49, epsilon = 0.5);
    }
}
