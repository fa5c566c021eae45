//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// # Example
/// ```
/// use myocean_geo::{haversine_distance, Coordinate};
///
/// let busan = Coordinate::new(35.1, 129.0);
/// let jeju = Coordinate::new(33.5, 126.5);
///
/// let distance = haversine_distance(&busan, &jeju);
/// assert!((distance - 290.5).abs() < 2.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Same as [`haversine_distance`], taking raw degree values.
///
/// ```
/// use myocean_geo::haversine_distance_km;
///
/// // 0.1° of longitude at 35°N is roughly 111 * cos(35°) * 0.1 km
/// let d = haversine_distance_km(35.0, 129.0, 35.0, 129.1);
/// assert!((d - 9.1).abs() < 0.2);
/// ```
#[inline]
pub fn haversine_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_distance(&Coordinate::new(lat1, lng1), &Coordinate::new(lat2, lng2))
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

/// Fast approximate distance for filtering (uses equirectangular projection).
///
/// Good enough at the scale of a coastal region; use it to discard far-away
/// points before applying Haversine.
#[inline]
pub fn approximate_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let y = lat2 - lat1;

    (x * x + y * y).sqrt() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUSAN: Coordinate = Coordinate { latitude: 35.1, longitude: 129.0 };
    const ULSAN: Coordinate = Coordinate { latitude: 35.5384, longitude: 129.3114 };
    const JEJU: Coordinate = Coordinate { latitude: 33.5, longitude: 126.5 };

    #[test]
    fn test_busan_to_jeju() {
        let distance = haversine_distance(&BUSAN, &JEJU);
        assert!((distance - 290.5).abs() < 2.0, "Busan-Jeju: {}", distance);
    }

    #[test]
    fn test_tenth_degree_longitude_at_35n() {
        let distance = haversine_distance_km(35.0, 129.0, 35.0, 129.1);
        assert!((distance - 9.1).abs() < 0.2, "got {}", distance);
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(haversine_distance(&BUSAN, &BUSAN), 0.0);
        assert_eq!(haversine_distance_km(-12.5, 45.0, -12.5, 45.0), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let d1 = haversine_distance(&BUSAN, &ULSAN);
        let d2 = haversine_distance(&ULSAN, &BUSAN);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_meters_conversion() {
        let km = haversine_distance(&BUSAN, &ULSAN);
        let meters = haversine_distance_meters(&BUSAN, &ULSAN);
        assert!((meters - km * 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_approximate_distance_reasonable() {
        let exact = haversine_distance(&BUSAN, &ULSAN);
        let approx = approximate_distance(&BUSAN, &ULSAN);
        let error = ((approx - exact) / exact).abs();
        assert!(error < 0.01, "Error: {}%", error * 100.0);
    }
}
