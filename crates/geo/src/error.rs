//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Invalid coordinate values
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Amount that is not one of the donation tiers
    #[error("Unknown donation tier: {0} (expected 100000, 1000000 or 10000000)")]
    UnknownTier(u64),

    /// Stored shape that does not describe a donation region
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with myocean-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate values
    InvalidCoordinate = 10001,
    /// Unknown donation tier
    UnknownTier = 10002,
    /// Invalid shape
    InvalidShape = 10003,
    /// JSON parsing error
    JsonParsing = 10004,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::UnknownTier(_) => GeoErrorCode::UnknownTier,
            GeoError::InvalidShape(_) => GeoErrorCode::InvalidShape,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
        }
    }

    /// Message prefixed with the numeric code, as handed to JS callers.
    pub fn coded_message(&self) -> String {
        format!("[{}] {}", self.code() as u32, self)
    }
}
