//! Unified error types for the backend service.

use thiserror::Error;

/// Unified error type for the backend service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Settings could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (binding or serving).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings loading and validation errors.
///
/// Cloneable so a memoized failure can be handed to every caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The environment could not be deserialized into settings.
    #[error("failed to read settings from environment: {0}")]
    Source(String),

    /// A field was present but failed validation.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidField {
        /// Name of the offending setting.
        field: &'static str,
        /// Raw value as supplied.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Name of the offending field, if the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidField { field, .. } => Some(*field),
            Self::Source(_) => None,
        }
    }
}

impl From<envy::Error> for ConfigError {
    fn from(err: envy::Error) -> Self {
        Self::Source(err.to_string())
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
