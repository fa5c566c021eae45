//! Geospatial utilities for MyOcean.
//!
//! This crate provides:
//! - Haversine distance calculations
//! - Donation geometry (tier → area → diamond polygon or square bounds)
//! - Radius filtering over located items with optional parallelism
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use myocean_geo::{diamond_polygon, haversine_distance, AreaTable, Coordinate, DonationTier};
//!
//! let busan = Coordinate::new(35.1, 129.0);
//! let area = AreaTable::Current.area_km2(DonationTier::Medium);
//! assert_eq!(area, 10.0);
//!
//! let [north, _, south, _] = diamond_polygon(&busan, area);
//! let diagonal_km = haversine_distance(&north, &south);
//! assert!((diagonal_km - (2.0 * area).sqrt()).abs() < 0.05);
//! ```

mod haversine;
pub mod batch;
pub mod donation;
mod error;

#[cfg(feature = "wasm")]
mod wasm;

pub use batch::{
    calculate_distances, calculate_distances_sorted, within_radius, DistanceResult, Located,
};
pub use donation::{
    area_for_amount, diamond_polygon, km_per_degree_lng, rect_bounds, AreaTable, Bounds,
    DonationShape, DonationTier, ShapeKind, KM_PER_DEGREE_LAT,
};
pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{
    approximate_distance, haversine_distance, haversine_distance_km, haversine_distance_meters,
    EARTH_RADIUS_KM, EARTH_RADIUS_M,
};

/// A geographic coordinate with latitude and longitude.
///
/// Serialized as `{"lat": .., "lng": ..}`, the layout used by stored donations
/// and the hotspot dataset.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Returns the coordinate, or an error naming the offending values.
    pub fn validated(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "lat={}, lng={}",
                self.latitude, self.longitude
            )))
        }
    }

    /// Short human-readable label used when no address is known,
    /// e.g. `35.10°N 129.05°E`.
    pub fn region_label(&self) -> String {
        format!("{:.2}°N {:.2}°E", self.latitude, self.longitude)
    }

    /// Cache key that identifies this exact point.
    pub fn cache_key(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}
