//! Error taxonomy reported by the adapters
//!
//! Every variant maps to a stable `kind()` string that becomes the `error`
//! field of the JSON report printed on stdout.

use thiserror::Error;

/// Errors surfaced to callers of the adapters
#[derive(Error, Debug)]
pub enum AdapterError {
    /// No image argument was supplied
    #[error("no image path supplied")]
    MissingImagePath,

    /// The classifier artifact could not be located or loaded
    #[error("model file not found: {0}")]
    ModelNotFound(String),

    /// Model invocation or output interpretation failed
    #[error("{0}")]
    PredictionFailed(String),

    /// The tabular payload could not be parsed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value could not be validated
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AdapterError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::MissingImagePath => "missing_image_path",
            AdapterError::ModelNotFound(_) => "model_not_found",
            AdapterError::PredictionFailed(_) => "prediction_failed",
            AdapterError::InvalidInput(_) => "invalid_input",
            AdapterError::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Human readable message, absent for errors that carry no detail
    pub fn message(&self) -> Option<String> {
        match self {
            AdapterError::MissingImagePath => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for AdapterError {
    fn from(err: config::ConfigError) -> Self {
        AdapterError::InvalidConfig(err.to_string())
    }
}
