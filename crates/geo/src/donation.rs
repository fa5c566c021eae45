//! Donation geometry.
//!
//! A donation protects a patch of sea whose size depends only on the donation
//! tier. The patch is drawn around the chosen coordinate either as a diamond
//! (a rhombus with equal diagonals) or as an axis-aligned square.
//!
//! Kilometres are converted to degrees with a local flat-earth approximation:
//! one degree of latitude is 111 km, one degree of longitude is
//! `111 km * cos(latitude)`. This holds for regions of a few kilometres and
//! degrades towards the poles.

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// Slack when matching a stored area against the tier tables.
const AREA_TOLERANCE_KM2: f64 = 1e-9;

/// Kilometres per degree of latitude.
pub const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Kilometres per degree of longitude at the given latitude.
#[inline]
pub fn km_per_degree_lng(latitude: f64) -> f64 {
    KM_PER_DEGREE_LAT * latitude.to_radians().cos()
}

/// The fixed amounts (KRW) a donor can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum DonationTier {
    /// 100,000 KRW
    Small,
    /// 1,000,000 KRW
    Medium,
    /// 10,000,000 KRW
    Large,
}

impl DonationTier {
    /// Every tier, smallest first.
    pub const ALL: [DonationTier; 3] =
        [DonationTier::Small, DonationTier::Medium, DonationTier::Large];

    /// Amount in KRW.
    pub const fn amount(self) -> u64 {
        match self {
            DonationTier::Small => 100_000,
            DonationTier::Medium => 1_000_000,
            DonationTier::Large => 10_000_000,
        }
    }
}

impl TryFrom<u64> for DonationTier {
    type Error = GeoError;

    fn try_from(amount: u64) -> Result<Self> {
        match amount {
            100_000 => Ok(DonationTier::Small),
            1_000_000 => Ok(DonationTier::Medium),
            10_000_000 => Ok(DonationTier::Large),
            other => Err(GeoError::UnknownTier(other)),
        }
    }
}

impl From<DonationTier> for u64 {
    fn from(tier: DonationTier) -> Self {
        tier.amount()
    }
}

/// Tier → protected area mapping.
///
/// The mapping changed once over the life of the project. Records written
/// under either table stay readable since they carry their own area; new
/// donations use whichever table is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaTable {
    /// 2 / 10 / 30 km²
    #[default]
    Current,
    /// 1 / 5 / 20 km²
    Legacy,
}

impl AreaTable {
    pub const ALL: [AreaTable; 2] = [AreaTable::Current, AreaTable::Legacy];

    /// The table under which `tier` maps to `area_km2`, if any.
    pub fn for_area(tier: DonationTier, area_km2: f64) -> Option<AreaTable> {
        AreaTable::ALL
            .into_iter()
            .find(|table| (table.area_km2(tier) - area_km2).abs() < AREA_TOLERANCE_KM2)
    }

    /// Protected area in km² for a tier.
    pub const fn area_km2(self, tier: DonationTier) -> f64 {
        match (self, tier) {
            (AreaTable::Current, DonationTier::Small) => 2.0,
            (AreaTable::Current, DonationTier::Medium) => 10.0,
            (AreaTable::Current, DonationTier::Large) => 30.0,
            (AreaTable::Legacy, DonationTier::Small) => 1.0,
            (AreaTable::Legacy, DonationTier::Medium) => 5.0,
            (AreaTable::Legacy, DonationTier::Large) => 20.0,
        }
    }
}

/// Protected area in km² for a tier, using the current table.
#[inline]
pub const fn area_for_amount(tier: DonationTier) -> f64 {
    AreaTable::Current.area_km2(tier)
}

/// Axis-aligned bounds of a donation region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    /// Checks both corners and that the south-west corner really is south-west.
    pub fn validated(self) -> Result<Self> {
        self.south_west.validated()?;
        self.north_east.validated()?;
        if self.south_west.latitude >= self.north_east.latitude
            || self.south_west.longitude >= self.north_east.longitude
        {
            return Err(GeoError::InvalidShape(format!(
                "bounds corners out of order: sw=({}, {}) ne=({}, {})",
                self.south_west.latitude,
                self.south_west.longitude,
                self.north_east.latitude,
                self.north_east.longitude
            )));
        }
        Ok(self)
    }

    /// Returns true if the point lies inside or on the edge.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.latitude >= self.south_west.latitude
            && point.latitude <= self.north_east.latitude
            && point.longitude >= self.south_west.longitude
            && point.longitude <= self.north_east.longitude
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south_west.latitude + self.north_east.latitude) / 2.0,
            (self.south_west.longitude + self.north_east.longitude) / 2.0,
        )
    }

    /// Height and width in km, using the degree conversion at the center latitude.
    pub fn size_km(&self) -> (f64, f64) {
        let height = (self.north_east.latitude - self.south_west.latitude) * KM_PER_DEGREE_LAT;
        let width = (self.north_east.longitude - self.south_west.longitude)
            * km_per_degree_lng(self.center().latitude);
        (height, width)
    }
}

/// Diamond around `center` whose area is `area_km2`.
///
/// Both diagonals have length `sqrt(2 * area)`. Vertices are returned in the
/// order north, east, south, west; each is offset from the center along one
/// axis only.
pub fn diamond_polygon(center: &Coordinate, area_km2: f64) -> [Coordinate; 4] {
    let half_diagonal_km = (2.0 * area_km2).sqrt() / 2.0;

    let d_lat = half_diagonal_km / KM_PER_DEGREE_LAT;
    let d_lng = half_diagonal_km / km_per_degree_lng(center.latitude);

    [
        Coordinate::new(center.latitude + d_lat, center.longitude),
        Coordinate::new(center.latitude, center.longitude + d_lng),
        Coordinate::new(center.latitude - d_lat, center.longitude),
        Coordinate::new(center.latitude, center.longitude - d_lng),
    ]
}

/// Square around `center` with side `sqrt(area_km2)`.
pub fn rect_bounds(center: &Coordinate, area_km2: f64) -> Bounds {
    let half_side_km = area_km2.sqrt() / 2.0;

    let d_lat = half_side_km / KM_PER_DEGREE_LAT;
    let d_lng = half_side_km / km_per_degree_lng(center.latitude);

    Bounds {
        south_west: Coordinate::new(center.latitude - d_lat, center.longitude - d_lng),
        north_east: Coordinate::new(center.latitude + d_lat, center.longitude + d_lng),
    }
}

/// Which shape new donations are drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Diamond,
    Rect,
}

impl ShapeKind {
    /// Builds the shape for a region of `area_km2` around `center`.
    pub fn build(self, center: &Coordinate, area_km2: f64) -> DonationShape {
        match self {
            ShapeKind::Diamond => DonationShape::Polygon(diamond_polygon(center, area_km2)),
            ShapeKind::Rect => DonationShape::Bounds(rect_bounds(center, area_km2)),
        }
    }
}

/// Map geometry of a donation region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DonationShape {
    /// Diamond vertices: north, east, south, west
    Polygon([Coordinate; 4]),
    /// Axis-aligned square
    Bounds(Bounds),
}

impl DonationShape {
    /// Rebuilds a polygon from stored vertices.
    ///
    /// The vertices must be valid coordinates in north, east, south, west
    /// order, each one the extreme point of the diamond in its direction.
    pub fn from_vertices(vertices: &[Coordinate]) -> Result<Self> {
        let vertices: [Coordinate; 4] = vertices.try_into().map_err(|_| {
            GeoError::InvalidShape(format!("polygon needs 4 vertices, got {}", vertices.len()))
        })?;
        for vertex in &vertices {
            vertex.validated()?;
        }

        let [north, east, south, west] = vertices;
        let ordered = north.latitude > east.latitude.max(west.latitude)
            && south.latitude < east.latitude.min(west.latitude)
            && east.longitude > north.longitude.max(south.longitude)
            && west.longitude < north.longitude.min(south.longitude);
        if !ordered {
            return Err(GeoError::InvalidShape(
                "polygon vertices must be ordered north, east, south, west".to_string(),
            ));
        }
        Ok(DonationShape::Polygon(vertices))
    }

    /// Wraps stored bounds after checking their corners.
    pub fn from_bounds(bounds: Bounds) -> Result<Self> {
        Ok(DonationShape::Bounds(bounds.validated()?))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            DonationShape::Polygon(_) => ShapeKind::Diamond,
            DonationShape::Bounds(_) => ShapeKind::Rect,
        }
    }

    /// Outline of the shape. Bounds are returned clockwise from the south-west corner.
    pub fn vertices(&self) -> Vec<Coordinate> {
        match self {
            DonationShape::Polygon(points) => points.to_vec(),
            DonationShape::Bounds(b) => vec![
                b.south_west,
                Coordinate::new(b.north_east.latitude, b.south_west.longitude),
                b.north_east,
                Coordinate::new(b.south_west.latitude, b.north_east.longitude),
            ],
        }
    }

    /// Smallest bounds containing the shape.
    pub fn bounding_box(&self) -> Bounds {
        match self {
            DonationShape::Polygon([north, east, south, west]) => Bounds {
                south_west: Coordinate::new(south.latitude, west.longitude),
                north_east: Coordinate::new(north.latitude, east.longitude),
            },
            DonationShape::Bounds(b) => *b,
        }
    }

    /// Area in km² measured back through the degree conversion.
    ///
    /// For a diamond this is `d1 * d2 / 2` over its two diagonals.
    pub fn area_km2(&self) -> f64 {
        let (height, width) = self.bounding_box().size_km();
        match self {
            DonationShape::Polygon(_) => height * width / 2.0,
            DonationShape::Bounds(_) => height * width,
        }
    }
}
