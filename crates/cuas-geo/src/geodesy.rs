//! Flat-earth distance/bearing/elevation, adequate within a local operating
//! bubble of a few kilometers. Adapted from the equirectangular projection
//! the rest of this workspace uses for terrain math, dropping the
//! sim-origin indirection in favor of plain lat/lon functions.

use cuas_core::constants::METERS_PER_DEGREE;
use cuas_core::types::GeoPosition;

/// Great-circle-free straight-line distance between two positions, meters.
pub fn distance(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let lat_mid = (a.lat_deg + b.lat_deg) / 2.0;
    let north = (b.lat_deg - a.lat_deg) * METERS_PER_DEGREE;
    let east = (b.lon_deg - a.lon_deg) * METERS_PER_DEGREE * lat_mid.to_radians().cos();
    let vertical = b.alt_m - a.alt_m;
    (north * north + east * east + vertical * vertical).sqrt()
}

/// Horizontal-only distance, ignoring altitude.
pub fn horizontal_distance(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let lat_mid = (a.lat_deg + b.lat_deg) / 2.0;
    let north = (b.lat_deg - a.lat_deg) * METERS_PER_DEGREE;
    let east = (b.lon_deg - a.lon_deg) * METERS_PER_DEGREE * lat_mid.to_radians().cos();
    (north * north + east * east).sqrt()
}

/// Initial bearing from `from` to `to`, degrees clockwise from true north,
/// normalized to `[0, 360)`.
pub fn bearing(from: &GeoPosition, to: &GeoPosition) -> f64 {
    let phi1 = from.lat_deg.to_radians();
    let phi2 = to.lat_deg.to_radians();
    let delta_lambda = (to.lon_deg - from.lon_deg).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    let theta = y.atan2(x).to_degrees();
    (theta + 360.0) % 360.0
}

/// Elevation angle from `from` to `to`, degrees, positive above the
/// horizon. Uses the flat-earth horizontal distance as the baseline.
pub fn elevation_angle(from: &GeoPosition, to: &GeoPosition) -> f64 {
    let horizontal = horizontal_distance(from, to);
    let vertical = to.alt_m - from.alt_m;
    vertical.atan2(horizontal.max(1e-6)).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_identical_position() {
        let p = GeoPosition::new(34.05, -118.24, 100.0);
        assert_eq!(distance(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude_is_111km() {
        let a = GeoPosition::new(0.0, 0.0, 0.0);
        let b = GeoPosition::new(1.0, 0.0, 0.0);
        assert!((distance(&a, &b) - METERS_PER_DEGREE).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_due_north_is_zero() {
        let a = GeoPosition::new(34.0, -118.0, 0.0);
        let b = GeoPosition::new(35.0, -118.0, 0.0);
        assert!(bearing(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_due_east_is_ninety() {
        let a = GeoPosition::new(0.0, 0.0, 0.0);
        let b = GeoPosition::new(0.0, 1.0, 0.0);
        assert!((bearing(&a, &b) - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_elevation_angle_level_is_zero() {
        let a = GeoPosition::new(34.0, -118.0, 100.0);
        let b = GeoPosition::new(34.01, -118.0, 100.0);
        assert!(elevation_angle(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_elevation_angle_positive_when_target_higher() {
        let a = GeoPosition::new(34.0, -118.0, 0.0);
        let b = GeoPosition::new(34.001, -118.0, 500.0);
        assert!(elevation_angle(&a, &b) > 0.0);
    }
}
