//! Initial (forward) great-circle bearing.
//!
//! For points `(φ1, λ1)` and `(φ2, λ2)`:
//!
//! - `x = sin(Δλ)·cos(φ2)`
//! - `y = cos(φ1)·sin(φ2) − sin(φ1)·cos(φ2)·cos(Δλ)`
//! - `θ = atan2(x, y)`, normalized into `[0, 360)`.

use crate::domain::Coordinate;

/// Compass bearing (degrees clockwise from north) from `start` toward `end`.
///
/// Identical points yield `0.0` (`atan2(0, 0)`); callers that care should
/// detect that case before relying on the direction.
pub fn initial_bearing(start: Coordinate, end: Coordinate) -> f64 {
    let phi1 = start.latitude.to_radians();
    let phi2 = end.latitude.to_radians();
    let delta_lambda = (end.longitude - start.longitude).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_bearing(x.atan2(y).to_degrees())
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert_abs_diff_eq!(initial_bearing(origin, Coordinate::new(1.0, 0.0)), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(initial_bearing(origin, Coordinate::new(0.0, 1.0)), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(initial_bearing(origin, Coordinate::new(-1.0, 0.0)), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(initial_bearing(origin, Coordinate::new(0.0, -1.0)), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn identical_points_do_not_panic() {
        let p = Coordinate::new(-6.914744, 107.609810);
        let b = initial_bearing(p, p);
        assert!(b.is_finite());
        assert_eq!(b, 0.0);
    }

    #[test]
    fn result_is_always_in_range() {
        let pts = [
            Coordinate::new(10.0, 100.0),
            Coordinate::new(-33.9, 151.2),
            Coordinate::new(51.5, -0.12),
            Coordinate::new(89.9, 179.9),
            Coordinate::new(-89.9, -179.9),
        ];
        for a in pts {
            for b in pts {
                let v = initial_bearing(a, b);
                assert!((0.0..360.0).contains(&v), "bearing {v} out of range");
            }
        }
    }

    #[test]
    fn normalize_wraps_negative_and_large_angles() {
        assert_abs_diff_eq!(normalize_bearing(-90.0), 270.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_bearing(720.5), 0.5, epsilon = 1e-9);
        assert_eq!(normalize_bearing(-1e-15), 0.0);
    }
}
