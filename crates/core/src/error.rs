//! Error handling with codes, context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports

use myocean_geo::{GeoError, GeoErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Internal = 1001,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,

    // Data errors (4xxx)
    DataError = 4000,
    DataParseError = 4001,
    UnknownTier = 4002,
    InvalidCoordinate = 4003,
    InvalidShape = 4004,
    InvalidInput = 4005,
    DuplicateDonation = 4006,

    // Funding errors (5xxx)
    FundingError = 5000,
    HotspotNotFound = 5001,
    FundingIncomplete = 5002,
    AlreadyCollecting = 5003,

    // Address lookup errors (6xxx)
    AddressError = 6000,
    AddressNotFound = 6001,
    AddressTimeout = 6002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            4 => "Data",
            5 => "Funding",
            6 => "Address",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    // Convenience constructors

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .myocean.toml file or use --config to specify a path")
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigValidationError, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataError, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn duplicate_donation(id: &str) -> Self {
        Self::new(ErrorCode::DuplicateDonation, format!("Duplicate donation id: {}", id))
            .with_suggestion("Each donation record must appear once in the export")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn hotspot_not_found(id: &str) -> Self {
        Self::new(ErrorCode::HotspotNotFound, format!("Hotspot not found: {}", id))
            .with_suggestion("Check the hotspot id against the loaded dataset")
    }

    pub fn funding_incomplete(id: &str, percent: u8) -> Self {
        Self::new(
            ErrorCode::FundingIncomplete,
            format!("Funding for hotspot {} is not complete ({}%)", id, percent),
        )
        .with_suggestion("Collection starts once nearby donations reach the completion threshold")
    }

    pub fn already_collecting(id: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyCollecting,
            format!("Collection is already running at hotspot {}", id),
        )
        .with_suggestion("End the current collection before starting another")
    }

    pub fn address_not_found(key: &str) -> Self {
        Self::new(ErrorCode::AddressNotFound, format!("No address for {}", key))
    }

    pub fn address_timeout(timeout: Duration) -> Self {
        Self::new(
            ErrorCode::AddressTimeout,
            format!("Address lookup timed out after {:?}", timeout),
        )
    }
}

/// Serializable error report for logging and API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const DATA_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const FUNDING_ERROR: i32 = 4;
}

impl Error {
    /// Exit code a CLI should use for this error
    pub fn exit_code(&self) -> i32 {
        match self.code.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            4 => exit_codes::DATA_ERROR,
            5 => exit_codes::FUNDING_ERROR,
            _ => exit_codes::FAILURE,
        }
    }
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::DataParseError, format!("JSON parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<GeoError> for Error {
    fn from(err: GeoError) -> Self {
        let code = match err.code() {
            GeoErrorCode::UnknownTier => ErrorCode::UnknownTier,
            GeoErrorCode::InvalidCoordinate => ErrorCode::InvalidCoordinate,
            GeoErrorCode::InvalidShape => ErrorCode::InvalidShape,
            GeoErrorCode::JsonParsing => ErrorCode::DataParseError,
        };
        Error::new(code, err.to_string())
            .with_context(format!("geo error {}", err.code() as u32))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::HotspotNotFound.to_string(), "E5001");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::UnknownTier.category(), "Data");
        assert_eq!(ErrorCode::AddressTimeout.category(), "Address");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::file_not_found("/path/to/donations.json")
            .with_context("While loading donations");

        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_geo_error_conversion() {
        let err: Error = GeoError::UnknownTier(42).into();
        assert_eq!(err.code, ErrorCode::UnknownTier);
        assert_eq!(err.exit_code(), exit_codes::DATA_ERROR);
        assert!(err.message.contains("42"));
        assert_eq!(err.context.as_deref(), Some("geo error 10002"));
    }

    #[test]
    fn test_geo_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err();
        let err: Error = GeoError::from(json_err).into();
        assert_eq!(err.code, ErrorCode::DataParseError);
        assert_eq!(err.context.as_deref(), Some("geo error 10004"));
    }

    #[test]
    fn test_io_and_internal_errors() {
        let io = std::io::Error::other("disk gone");
        let err = Error::io("Failed to read addresses.json").with_source(io);
        assert_eq!(err.code, ErrorCode::IoError);
        assert_eq!(err.to_report().source.as_deref(), Some("disk gone"));

        let err = Error::internal("Failed to start the async runtime");
        assert_eq!(err.code.category(), "General");
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_duplicate_donation_is_a_data_error() {
        let err = Error::duplicate_donation("same");
        assert_eq!(err.code.to_string(), "E4006");
        assert_eq!(err.exit_code(), exit_codes::DATA_ERROR);
        assert!(err.message.contains("same"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::funding_incomplete("debris-3", 40).with_context("Starting collection");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E5002"));
        assert!(json.contains("Funding"));
    }
}
