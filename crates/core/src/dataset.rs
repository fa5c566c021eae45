//! Marine hotspot dataset loading.
//!
//! The preprocessing pipeline aggregates fishing-activity reports and debris
//! survey records onto a 0.1° grid and writes `marine_hotspots.json`:
//!
//! ```json
//! {
//!   "metadata": {"generated_at": "...", "grid_size_degrees": 0.1, ...},
//!   "fishing_hotspots": [{"lat": 35.05, "lng": 129.05, "intensity": 0.8, "activity_count": 120}],
//!   "debris_hotspots": [{"lat": 35.15, "lng": 129.15, "intensity": 0.4, "debris_count": 37}]
//! }
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::model::{ensure_unique_ids, Donation, Hotspot, HotspotKind};
use myocean_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest funding target, reached at intensity 0
pub const BASE_TARGET_AMOUNT: u64 = 40_000_000;
/// Extra target added at intensity 1
pub const INTENSITY_TARGET_SPAN: u64 = 20_000_000;
/// Targets are rounded to this unit
pub const TARGET_ROUNDING: u64 = 1_000_000;

/// Funding target for a hotspot of the given intensity.
///
/// `40M + floor(intensity * 20M)`, rounded to the nearest million KRW.
pub fn target_amount_for(intensity: f64) -> u64 {
    let intensity = intensity.clamp(0.0, 1.0);
    let raw = BASE_TARGET_AMOUNT + (intensity * INTENSITY_TARGET_SPAN as f64).floor() as u64;
    (raw as f64 / TARGET_ROUNDING as f64).round() as u64 * TARGET_ROUNDING
}

/// Dataset metadata written by the preprocessing step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub fishing_records: Option<u64>,
    #[serde(default)]
    pub debris_records: Option<u64>,
    #[serde(default)]
    pub grid_size_degrees: Option<f64>,
    #[serde(default)]
    pub grid_size_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishingCell {
    pub lat: f64,
    pub lng: f64,
    pub intensity: f64,
    pub activity_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisCell {
    pub lat: f64,
    pub lng: f64,
    pub intensity: f64,
    pub debris_count: u64,
}

/// Raw `marine_hotspots.json` content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarineHotspotsData {
    #[serde(default)]
    pub metadata: DatasetMetadata,
    #[serde(default)]
    pub fishing_hotspots: Vec<FishingCell>,
    #[serde(default)]
    pub debris_hotspots: Vec<DebrisCell>,
}

impl MarineHotspotsData {
    /// Convert grid cells to hotspots: fishing first, then debris.
    pub fn into_hotspots(self) -> Vec<Hotspot> {
        let fishing = self
            .fishing_hotspots
            .into_iter()
            .enumerate()
            .map(|(index, cell)| Hotspot {
                id: format!("fishing-{}", index),
                location: Coordinate::new(cell.lat, cell.lng),
                intensity: cell.intensity,
                activity_count: cell.activity_count,
                kind: HotspotKind::Fishing,
                region_name: None,
                target_amount: Some(target_amount_for(cell.intensity)),
            });

        let debris = self
            .debris_hotspots
            .into_iter()
            .enumerate()
            .map(|(index, cell)| Hotspot {
                id: format!("debris-{}", index),
                location: Coordinate::new(cell.lat, cell.lng),
                intensity: cell.intensity,
                activity_count: cell.debris_count,
                kind: HotspotKind::Debris,
                region_name: None,
                target_amount: Some(target_amount_for(cell.intensity)),
            });

        fishing.chain(debris).collect()
    }
}

/// Either the raw grid dataset or an already-converted hotspot list.
#[derive(Deserialize)]
#[serde(untagged)]
enum HotspotSource {
    List(Vec<Hotspot>),
    Dataset(MarineHotspotsData),
}

/// Parse hotspots from JSON in either supported layout.
pub fn hotspots_from_json(json: &str) -> Result<Vec<Hotspot>> {
    let source: HotspotSource = serde_json::from_str(json)?;
    Ok(match source {
        HotspotSource::List(hotspots) => hotspots,
        HotspotSource::Dataset(data) => data.into_hotspots(),
    })
}

/// Load hotspots from a file.
pub fn load_hotspots(path: impl AsRef<Path>) -> Result<Vec<Hotspot>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Reading {}", path.display()))?;
    let hotspots = hotspots_from_json(&content).context(format!("Parsing {}", path.display()))?;

    tracing::debug!(path = %path.display(), count = hotspots.len(), "Loaded hotspots");
    Ok(hotspots)
}

/// Parse an exported donation list.
///
/// Accepts a bare array, as kept in browser storage, or the demo-data
/// wrapper `{"donations": [...]}`. Donation ids must be unique.
pub fn donations_from_json(json: &str) -> Result<Vec<Donation>> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    let list = if value.get("donations").is_some() {
        value["donations"].take()
    } else {
        value
    };

    if !list.is_array() {
        return Err(Error::data("Expected a JSON array of donations"));
    }
    let donations: Vec<Donation> = serde_json::from_value(list)?;
    ensure_unique_ids(&donations)?;
    Ok(donations)
}

/// Load an exported donation list from a file.
pub fn load_donations(path: impl AsRef<Path>) -> Result<Vec<Donation>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Reading {}", path.display()))?;
    let donations =
        donations_from_json(&content).context(format!("Parsing {}", path.display()))?;

    tracing::debug!(path = %path.display(), count = donations.len(), "Loaded donations");
    Ok(donations)
}
