//! Configuration schema definitions

use crate::error::{Error, Result};
use myocean_geo::{AreaTable, ShapeKind};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub geometry: GeometryConfig,

    #[serde(default)]
    pub funding: FundingConfig,

    #[serde(default)]
    pub cleanup: CleanupConfig,

    #[serde(default)]
    pub address: AddressConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check values that deserialize fine but make no sense
    pub fn validate(&self) -> Result<()> {
        let radius = self.funding.radius_km;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::config_invalid(format!(
                "funding.radius_km must be a positive number, got {}",
                radius
            )));
        }

        let threshold = self.funding.completion_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::config_invalid(format!(
                "funding.completion_threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        if self.cleanup.duration_days == 0 {
            return Err(Error::config_invalid("cleanup.duration_days cannot be zero"));
        }

        if self.address.timeout_ms == 0 {
            return Err(Error::config_invalid("address.timeout_ms cannot be zero"));
        }

        Ok(())
    }
}

/// How donations are turned into map geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct GeometryConfig {
    /// Tier → area mapping
    #[serde(default)]
    pub area_table: AreaTable,

    /// Shape drawn for new donations
    #[serde(default)]
    pub shape: ShapeKind,
}

/// Funding aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingConfig {
    /// Donations within this distance of a hotspot count towards it
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Fraction of the target that makes a hotspot collection-ready
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            completion_threshold: default_completion_threshold(),
        }
    }
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_completion_threshold() -> f64 {
    0.7
}

/// Simulated cleanup progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Days until a donation's region is reported fully cleaned
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            duration_days: default_duration_days(),
        }
    }
}

fn default_duration_days() -> u32 {
    100
}

/// Address lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressConfig {
    /// Give up on a lookup after this many milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    3000
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let schema = ConfigSchema::default();
        assert_eq!(schema.geometry.area_table, AreaTable::Current);
        assert_eq!(schema.geometry.shape, ShapeKind::Diamond);
        assert_eq!(schema.funding.radius_km, 10.0);
        assert_eq!(schema.funding.completion_threshold, 0.7);
        assert_eq!(schema.cleanup.duration_days, 100);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [geometry]
            area_table = "legacy"
            shape = "rect"

            [funding]
            radius_km = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(schema.geometry.area_table, AreaTable::Legacy);
        assert_eq!(schema.geometry.shape, ShapeKind::Rect);
        assert_eq!(schema.funding.radius_km, 5.0);
        assert_eq!(schema.funding.completion_threshold, 0.7);
    }

    #[test]
    fn test_unknown_area_table_rejected() {
        let result: std::result::Result<ConfigSchema, _> = toml::from_str(
            r#"
            [geometry]
            area_table = "blended"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let mut schema = ConfigSchema::default();
        schema.funding.completion_threshold = 1.5;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.funding.radius_km = 0.0;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.cleanup.duration_days = 0;
        assert!(schema.validate().is_err());
    }
}
