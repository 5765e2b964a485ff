//! Pricing error types.

use thiserror::Error;

/// Errors that can occur in pricing operations.
///
/// The core calculation never fails; these come from the validating entry
/// points, orchestrator lookups and configuration loading.
#[derive(Error, Debug)]
pub enum PricingError {
    /// A price input was negative, NaN or infinite.
    #[error("Invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },

    /// A percentage rule whose margin cannot produce a finite price.
    #[error("Profit margin must be in [0, 100), got {0}")]
    InvalidMargin(f64),

    /// Variant not found in the working set.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Rule not found in the registry.
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// Failed to read or write a configuration file.
    #[error("Failed to access config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// A rule whose parameters cannot produce a finite price.
    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    /// Configuration parsed but is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::SerializationError(e.to_string())
    }
}

impl From<toml::ser::Error> for PricingError {
    fn from(e: toml::ser::Error) -> Self {
        PricingError::SerializationError(e.to_string())
    }
}
