//! WASM bindings for the geo crate.
//!
//! Lets the browser front end compute donation geometry and proximity with
//! the same code the CLI uses.

use crate::batch::{calculate_distances_within_radius, PointItem};
use crate::{haversine_distance_km, AreaTable, Coordinate, DonationTier, GeoError, ShapeKind};
use wasm_bindgen::prelude::*;

fn to_js(err: impl Into<GeoError>) -> JsValue {
    JsValue::from_str(&err.into().coded_message())
}

fn tier_from_js(amount: f64) -> Result<DonationTier, JsValue> {
    if !amount.is_finite() || amount < 0.0 || amount.fract() != 0.0 {
        return Err(JsValue::from_str(&format!("Invalid amount: {}", amount)));
    }
    DonationTier::try_from(amount as u64).map_err(to_js)
}

fn parse_enum<T: serde::de::DeserializeOwned>(name: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|e| JsValue::from_str(&format!("Unknown option '{}': {}", name, e)))
}

/// Great-circle distance in kilometers.
#[wasm_bindgen]
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_distance_km(lat1, lng1, lat2, lng2)
}

/// Protected area in km² for a donation amount.
///
/// # Arguments
/// * `amount` - Donation amount in KRW (one of the tiers)
/// * `table` - `"current"` or `"legacy"`
#[wasm_bindgen]
pub fn donation_area(amount: f64, table: &str) -> Result<f64, JsValue> {
    let tier = tier_from_js(amount)?;
    let table: AreaTable = parse_enum(table)?;
    Ok(table.area_km2(tier))
}

/// Donation shape as JSON: `{"kind", "areaKm2", "vertices": [{lat, lng}, ..]}`.
#[wasm_bindgen]
pub fn donation_shape(
    lat: f64,
    lng: f64,
    amount: f64,
    table: &str,
    shape: &str,
) -> Result<String, JsValue> {
    let tier = tier_from_js(amount)?;
    let table: AreaTable = parse_enum(table)?;
    let kind: ShapeKind = parse_enum(shape)?;

    let center = Coordinate::new(lat, lng).validated().map_err(to_js)?;
    let area = table.area_km2(tier);
    let shape = kind.build(&center, area);

    let result = serde_json::json!({
        "kind": shape.kind(),
        "areaKm2": area,
        "vertices": shape.vertices(),
    });
    Ok(result.to_string())
}

/// Filter points within a radius.
///
/// # Arguments
/// * `points_json` - JSON array of `{"id", "location": {"lat", "lng"}}`
///
/// # Returns
/// JSON string of `{"id", "distance"}` sorted by distance
#[wasm_bindgen]
pub fn filter_within_radius(
    lat: f64,
    lng: f64,
    points_json: &str,
    radius_km: f64,
) -> Result<String, JsValue> {
    let items: Vec<PointItem> = serde_json::from_str(points_json).map_err(to_js)?;

    let results = calculate_distances_within_radius(&Coordinate::new(lat, lng), &items, radius_km);

    serde_json::to_string(&results).map_err(to_js)
}
