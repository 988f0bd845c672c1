//! Error types for selectpicker configuration.

use thiserror::Error;

/// Errors raised while loading picker configuration.
///
/// Widget operations themselves never fail; stale or unknown references are
/// ignored. Only parsing configuration documents can produce an error.
#[derive(Debug, Error)]
pub enum PickerError {
    /// YAML document could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON document could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field parsed but holds an unusable value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Error message
        message: String,
    },
}

/// Result alias for configuration loading.
pub type PickerResult<T> = Result<T, PickerError>;
