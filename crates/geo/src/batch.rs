//! Batch distance calculations with optional parallelism.
//!
//! Donations and hotspots are joined purely by proximity, so most callers need
//! "everything within r km of this point". These helpers do that scan once,
//! in parallel when the `parallel` feature is enabled.

use crate::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};

/// Anything with an identity and a position on the map.
pub trait Located {
    /// Stable identifier
    fn id(&self) -> &str;
    /// Position used for proximity checks
    fn location(&self) -> Coordinate;
}

/// Result of a distance calculation for a single item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceResult {
    /// The item ID
    pub id: String,
    /// Calculated distance in kilometers
    pub distance: f64,
}

/// Plain located point, used when input arrives as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointItem {
    pub id: String,
    pub location: Coordinate,
}

impl Located for PointItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> Coordinate {
        self.location
    }
}

/// Calculate distances from `center` to every item, in input order.
///
/// # Example
/// ```
/// use myocean_geo::{calculate_distances, batch::PointItem, Coordinate};
///
/// let items = vec![
///     PointItem { id: "a".into(), location: Coordinate::new(35.10, 129.05) },
///     PointItem { id: "b".into(), location: Coordinate::new(35.20, 129.20) },
/// ];
///
/// let results = calculate_distances(&Coordinate::new(35.1, 129.0), &items);
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].id, "a");
/// ```
pub fn calculate_distances<T: Located + Sync>(
    center: &Coordinate,
    items: &[T],
) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items
            .par_iter()
            .map(|item| calculate_single_distance(center, item))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .map(|item| calculate_single_distance(center, item))
            .collect()
    }
}

/// Calculate distances and return items sorted by distance.
///
/// `max_results` truncates after sorting; `None` keeps everything.
pub fn calculate_distances_sorted<T: Located + Sync>(
    center: &Coordinate,
    items: &[T],
    max_results: Option<usize>,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(center, items);

    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Distances for items within `radius_km` (inclusive), closest first.
pub fn calculate_distances_within_radius<T: Located + Sync>(
    center: &Coordinate,
    items: &[T],
    radius_km: f64,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(center, items);

    results.retain(|r| r.distance <= radius_km);
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    results
}

/// Items within `radius_km` (inclusive) of `center`, in input order.
pub fn within_radius<'a, T: Located + Sync>(
    center: &Coordinate,
    items: &'a [T],
    radius_km: f64,
) -> Vec<&'a T> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items
            .par_iter()
            .filter(|item| haversine_distance(center, &item.location()) <= radius_km)
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .filter(|item| haversine_distance(center, &item.location()) <= radius_km)
            .collect()
    }
}

#[inline]
fn calculate_single_distance<T: Located>(center: &Coordinate, item: &T) -> DistanceResult {
    DistanceResult {
        id: item.id().to_string(),
        distance: haversine_distance(center, &item.location()),
    }
}
