//! Donation and hotspot records.
//!
//! Both types serialize with the camelCase layout the web front end keeps in
//! browser storage, so exported donation lists load unchanged.

use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use myocean_geo::{
    AreaTable, Bounds, Coordinate, DonationShape, DonationTier, Located, ShapeKind,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A confirmed donation and the sea region it protects.
///
/// `area_km2` depends only on the tier (under the table in force when the
/// donation was made) and `shape` only on `(location, area_km2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DonationRecord", into = "DonationRecord")]
pub struct Donation {
    pub id: String,
    pub name: String,
    pub tier: DonationTier,
    pub location: Coordinate,
    pub area_km2: f64,
    pub shape: DonationShape,
    pub date: DateTime<Utc>,
    /// Last stored progress, 0..=100. See [`crate::stats::cleanup_progress`]
    /// for the value derived from elapsed time.
    pub cleanup_progress: u8,
    pub region_name: String,
    pub hotspot_id: Option<String>,
}

impl Donation {
    /// Create a donation at `location`, drawing its region with `geometry`.
    pub fn new(
        name: impl Into<String>,
        tier: DonationTier,
        location: Coordinate,
        geometry: &GeometryConfig,
        date: DateTime<Utc>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::invalid_input("Donor name cannot be empty"));
        }
        let location = location.validated()?;

        let area_km2 = geometry.area_table.area_km2(tier);
        let shape = geometry.shape.build(&location, area_km2);

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            tier,
            location,
            area_km2,
            shape,
            date,
            cleanup_progress: 0,
            region_name: location.region_label(),
            hotspot_id: None,
        })
    }

    /// Amount in KRW
    pub fn amount(&self) -> u64 {
        self.tier.amount()
    }
}

/// Fails on the first donation id that appears twice.
pub fn ensure_unique_ids(donations: &[Donation]) -> Result<()> {
    let mut seen = HashSet::with_capacity(donations.len());
    match donations.iter().find(|d| !seen.insert(d.id.as_str())) {
        Some(duplicate) => Err(Error::duplicate_donation(&duplicate.id)),
        None => Ok(()),
    }
}

impl Located for Donation {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> Coordinate {
        self.location
    }
}

/// Storage layout of a donation.
///
/// Older records have neither `polygon` nor `bounds`; newer ones carry both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    pub id: String,
    pub name: String,
    pub amount: u64,
    pub location: Coordinate,
    pub area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Coordinate>>,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot_id: Option<String>,
    #[serde(default)]
    pub cleanup_progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
}

/// RFC 3339 timestamps, also accepting the zone-less ISO form written by the
/// demo data scripts (read as UTC).
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(date) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(date.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| de::Error::custom(format!("invalid date '{}': {}", raw, e)))
    }
}

impl TryFrom<DonationRecord> for Donation {
    type Error = Error;

    fn try_from(record: DonationRecord) -> Result<Self> {
        let tier = DonationTier::try_from(record.amount)?;
        let location = record.location.validated()?;

        if AreaTable::for_area(tier, record.area).is_none() {
            return Err(Error::data(format!(
                "Donation {} has area {} km², which no area table gives a {} KRW donation",
                record.id, record.area, record.amount
            )));
        }

        // Polygon wins when both are stored.
        let shape = match (record.polygon, record.bounds) {
            (Some(vertices), _) => DonationShape::from_vertices(&vertices)?,
            (None, Some(bounds)) => DonationShape::from_bounds(bounds)?,
            (None, None) => ShapeKind::Diamond.build(&location, record.area),
        };

        Ok(Self {
            region_name: record.region_name.unwrap_or_else(|| location.region_label()),
            id: record.id,
            name: record.name,
            tier,
            location,
            area_km2: record.area,
            shape,
            date: record.date,
            cleanup_progress: record.cleanup_progress.min(100),
            hotspot_id: record.hotspot_id,
        })
    }
}

impl From<Donation> for DonationRecord {
    fn from(donation: Donation) -> Self {
        let (polygon, bounds) = match donation.shape {
            DonationShape::Polygon(vertices) => (Some(vertices.to_vec()), None),
            DonationShape::Bounds(bounds) => (None, Some(bounds)),
        };

        Self {
            id: donation.id,
            name: donation.name,
            amount: donation.tier.amount(),
            location: donation.location,
            area: donation.area_km2,
            bounds,
            polygon,
            date: donation.date,
            hotspot_id: donation.hotspot_id,
            cleanup_progress: donation.cleanup_progress,
            region_name: Some(donation.region_name),
        }
    }
}

/// What a hotspot grid cell measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    /// Fishing vessel activity
    Fishing,
    /// Marine debris density
    Debris,
}

/// A fixed marker from the hotspot dataset. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    #[serde(flatten)]
    pub location: Coordinate,
    /// Normalized density, 0..=1
    pub intensity: f64,
    pub activity_count: u64,
    #[serde(rename = "type")]
    pub kind: HotspotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    /// Funding goal in KRW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<u64>,
}

impl Hotspot {
    /// Stored region name, or the coordinate label.
    pub fn display_name(&self) -> String {
        self.region_name
            .clone()
            .unwrap_or_else(|| self.location.region_label())
    }
}

impl Located for Hotspot {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> Coordinate {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn busan() -> Coordinate {
        Coordinate::new(35.1, 129.05)
    }

    fn small_donation() -> Donation {
        Donation::new("a", DonationTier::Small, busan(), &GeometryConfig::default(), Utc::now())
            .unwrap()
    }

    #[test]
    fn test_new_donation_derives_area_and_shape() {
        let donation = Donation::new(
            "김해양",
            DonationTier::Medium,
            busan(),
            &GeometryConfig::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(donation.amount(), 1_000_000);
        assert_eq!(donation.area_km2, 10.0);
        assert!(matches!(donation.shape, DonationShape::Polygon(_)));
        assert_eq!(donation.region_name, "35.10°N 129.05°E");
        assert_eq!(donation.cleanup_progress, 0);
        assert!(Uuid::parse_str(&donation.id).is_ok());
    }

    #[test]
    fn test_new_donation_with_legacy_rect_geometry() {
        let geometry = GeometryConfig {
            area_table: AreaTable::Legacy,
            shape: ShapeKind::Rect,
        };
        let donation =
            Donation::new("a", DonationTier::Large, busan(), &geometry, Utc::now()).unwrap();

        assert_eq!(donation.area_km2, 20.0);
        assert!(matches!(donation.shape, DonationShape::Bounds(_)));
    }

    #[test]
    fn test_new_donation_rejects_bad_input() {
        let geometry = GeometryConfig::default();
        let err =
            Donation::new("  ", DonationTier::Small, busan(), &geometry, Utc::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let off_map = Coordinate::new(95.0, 0.0);
        let err =
            Donation::new("a", DonationTier::Small, off_map, &geometry, Utc::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinate);
    }

    #[test]
    fn test_donation_round_trips_through_storage_layout() {
        let donation = small_donation();

        let json = serde_json::to_value(&donation).unwrap();
        assert_eq!(json["amount"], json!(100_000));
        assert_eq!(json["polygon"].as_array().unwrap().len(), 4);
        assert!(json.get("bounds").is_none());
        assert!(json.get("cleanupProgress").is_some());

        let back: Donation = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, donation.id);
        assert_eq!(back.tier, donation.tier);
        assert_eq!(back.date, donation.date);
        for (a, b) in back.shape.vertices().iter().zip(donation.shape.vertices()) {
            assert!((a.latitude - b.latitude).abs() < 1e-12);
            assert!((a.longitude - b.longitude).abs() < 1e-12);
        }
    }

    #[test]
    fn test_legacy_record_without_shape_gets_diamond() {
        let json = json!({
            "id": "demo-1",
            "name": "이바다",
            "amount": 1000000,
            "location": {"lat": 35.2, "lng": 129.1},
            "area": 5,
            "date": "2025-01-10T09:00:00Z",
            "cleanupProgress": 27,
            "regionName": "35.20°N 129.10°E"
        });

        let donation: Donation = serde_json::from_value(json).unwrap();
        assert_eq!(donation.area_km2, 5.0);
        assert!(matches!(donation.shape, DonationShape::Polygon(_)));
        assert!((donation.shape.area_km2() - 5.0).abs() < 1e-6);
        assert_eq!(donation.cleanup_progress, 27);
    }

    #[test]
    fn test_record_with_naive_timestamp() {
        let json = json!({
            "id": "demo-2",
            "name": "a",
            "amount": 100000,
            "location": {"lat": 35.2, "lng": 129.1},
            "area": 1,
            "date": "2025-01-10T09:30:00.250000"
        });

        let donation: Donation = serde_json::from_value(json).unwrap();
        assert_eq!(donation.date.to_rfc3339(), "2025-01-10T09:30:00.250+00:00");
    }

    #[test]
    fn test_record_with_both_shapes_prefers_polygon() {
        let donation = small_donation();
        let mut record = DonationRecord::from(donation);
        record.bounds = Some(myocean_geo::rect_bounds(&busan(), 2.0));

        let donation = Donation::try_from(record).unwrap();
        assert!(matches!(donation.shape, DonationShape::Polygon(_)));
    }

    #[test]
    fn test_record_with_unknown_amount_is_rejected() {
        let json = json!({
            "id": "x",
            "name": "a",
            "amount": 500000,
            "location": {"lat": 35.2, "lng": 129.1},
            "area": 5,
            "date": "2025-01-10T09:00:00Z"
        });

        assert!(serde_json::from_value::<Donation>(json).is_err());
    }

    #[test]
    fn test_record_with_mismatched_area_is_rejected() {
        let mut record = DonationRecord::from(small_donation());
        record.polygon = None;
        record.area = 999.0;

        let err = Donation::try_from(record.clone()).unwrap_err();
        assert_eq!(err.code, ErrorCode::DataError);

        // 1 km² is the legacy area for the small tier
        record.area = 1.0;
        assert_eq!(Donation::try_from(record).unwrap().area_km2, 1.0);
    }

    #[test]
    fn test_record_with_reordered_polygon_is_rejected() {
        let mut record = DonationRecord::from(small_donation());
        if let Some(vertices) = record.polygon.as_mut() {
            vertices.rotate_left(1);
        }

        let err = Donation::try_from(record).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidShape);
    }

    #[test]
    fn test_ensure_unique_ids() {
        let first = small_donation();
        let second = small_donation();
        assert!(ensure_unique_ids(&[first.clone(), second]).is_ok());

        let err = ensure_unique_ids(&[first.clone(), first]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateDonation);
    }

    #[test]
    fn test_hotspot_layout() {
        let json = json!({
            "id": "debris-0",
            "lat": 35.05,
            "lng": 129.05,
            "intensity": 0.8,
            "activityCount": 120,
            "type": "debris",
            "targetAmount": 56000000
        });

        let hotspot: Hotspot = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(hotspot.kind, HotspotKind::Debris);
        assert_eq!(hotspot.location, Coordinate::new(35.05, 129.05));
        assert_eq!(hotspot.target_amount, Some(56_000_000));
        assert_eq!(hotspot.display_name(), "35.05°N 129.05°E");

        assert_eq!(serde_json::to_value(&hotspot).unwrap(), json);
    }
}
