//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`LatentCatalogError`] which covers every failure mode of the
//! resolution catalog, the usage store, the latent allocator and configuration loading.
//! It uses `thiserror` for ergonomic error definitions and includes constructor helpers
//! for the variants that carry context.
//!
//! # Public API
//! - [`LatentCatalogError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, LatentCatalogError>`
//!
//! # Error Categories
//! - **Source errors**: Unreadable preset file, malformed JSON, wrong top-level shape
//! - **Record errors**: Missing, non-numeric or out-of-bounds width/height
//! - **Lookup errors**: Unknown resolution selector, batch size out of range
//! - **Persistence errors**: Usage store unreadable or unwritable
//! - **Allocation errors**: Latent settings that cannot produce a shape
//!
//! Source and record errors never escape a catalog load; they are logged and skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for latent-resolutions
#[derive(Error, Debug)]
pub enum LatentCatalogError {
    // Generic I/O and serialization
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Source errors
    #[error("Failed to read resolution source '{path}': {source}")]
    SourceReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse resolution source '{path}': {source}")]
    SourceParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Resolution source '{path}' must contain a JSON array, found {found}")]
    SourceNotAList { path: PathBuf, found: String },

    #[error("Failed to scan catalog directory '{path}': {source}")]
    CatalogScanFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Record errors
    #[error("Record is not a JSON object")]
    RecordNotAnObject,

    #[error("Record is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("Field '{field}' is not numeric: {value}")]
    NonNumericField { field: &'static str, value: String },

    #[error("Field '{field}' must be positive (got {value})")]
    NonPositiveDimension { field: &'static str, value: i64 },

    #[error("Field '{field}' = {value} is outside the allowed range {min}-{max}")]
    DimensionOutOfBounds {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    // Lookup errors
    #[error("Resolution not found: {key}")]
    ResolutionNotFound { key: String },

    #[error("Batch size {batch_size} is out of range ({min}-{max} allowed)")]
    BatchSizeOutOfRange { batch_size: u32, min: u32, max: u32 },

    #[error("Cleanup age must not be negative (got {days} days)")]
    InvalidCleanupAge { days: i64 },

    // Persistence errors
    #[error("Failed to load usage stats '{path}': {message}")]
    UsageLoadFailed { path: PathBuf, message: String },

    #[error("Failed to save usage stats '{path}': {message}")]
    UsageSaveFailed { path: PathBuf, message: String },

    // Allocation errors
    #[error("Invalid latent settings: {message}")]
    InvalidLatentSettings { message: String },

    // Configuration errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Could not determine configuration directory")]
    ConfigDirectoryNotFound,
}

/// Convenience type alias for Results using LatentCatalogError
pub type Result<T> = std::result::Result<T, LatentCatalogError>;

impl LatentCatalogError {
    /// Create a source read failed error
    pub fn source_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a source parse failed error
    pub fn source_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::SourceParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a source shape error naming what was found instead of an array
    pub fn source_not_a_list(path: impl Into<PathBuf>, found: impl Into<String>) -> Self {
        Self::SourceNotAList {
            path: path.into(),
            found: found.into(),
        }
    }

    pub fn catalog_scan_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CatalogScanFailed {
            path: path.into(),
            source,
        }
    }

    pub fn non_numeric_field(field: &'static str, value: impl Into<String>) -> Self {
        Self::NonNumericField {
            field,
            value: value.into(),
        }
    }

    pub fn dimension_out_of_bounds(field: &'static str, value: u32, min: u32, max: u32) -> Self {
        Self::DimensionOutOfBounds {
            field,
            value,
            min,
            max,
        }
    }

    /// Create a resolution not found error
    pub fn resolution_not_found(key: impl Into<String>) -> Self {
        Self::ResolutionNotFound { key: key.into() }
    }

    pub fn batch_size_out_of_range(batch_size: u32, min: u32, max: u32) -> Self {
        Self::BatchSizeOutOfRange {
            batch_size,
            min,
            max,
        }
    }

    pub fn invalid_cleanup_age(days: i64) -> Self {
        Self::InvalidCleanupAge { days }
    }

    /// Create a usage load failed error
    pub fn usage_load_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::UsageLoadFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a usage save failed error
    pub fn usage_save_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::UsageSaveFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_latent_settings(message: impl Into<String>) -> Self {
        Self::InvalidLatentSettings {
            message: message.into(),
        }
    }

    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_not_found_display() {
        let err = LatentCatalogError::resolution_not_found("640 x 480 (1.33)");
        assert_eq!(err.to_string(), "Resolution not found: 640 x 480 (1.33)");
    }

    #[test]
    fn test_batch_size_out_of_range_display() {
        let err = LatentCatalogError::batch_size_out_of_range(100, 1, 64);
        assert_eq!(
            err.to_string(),
            "Batch size 100 is out of range (1-64 allowed)"
        );
    }

    #[test]
    fn test_source_parse_failed_mentions_path() {
        let json_err = serde_json::from_str::<serde_json::Value>("[ broken").unwrap_err();
        let err = LatentCatalogError::source_parse_failed("/presets/sdxl.json", json_err);
        assert!(err.to_string().contains("/presets/sdxl.json"));
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_source_not_a_list() {
        let err = LatentCatalogError::source_not_a_list("/presets/custom.json", "object");
        assert!(err.to_string().contains("must contain a JSON array"));
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn test_dimension_out_of_bounds() {
        let err = LatentCatalogError::dimension_out_of_bounds("height", 32, 64, 8192);
        assert_eq!(
            err.to_string(),
            "Field 'height' = 32 is outside the allowed range 64-8192"
        );
    }

    #[test]
    fn test_usage_save_failed() {
        let err = LatentCatalogError::usage_save_failed("/data/usage_stats.json", "disk full");
        assert!(err.to_string().contains("/data/usage_stats.json"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_config_read_failed() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LatentCatalogError::config_read_failed("/etc/config.json", io_err);
        assert!(err.to_string().contains("/etc/config.json"));
        assert!(err.to_string().contains("access denied"));
    }
}
