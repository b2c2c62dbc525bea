//! Error types for configuration loading.

use std::sync::Arc;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while fetching or interpreting configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required parameter is absent or blank.
    #[error("required configuration parameter '{0}' is missing")]
    MissingParameter(String),

    /// A parameter is present but cannot be interpreted.
    #[error("configuration parameter '{key}' is invalid: {reason}")]
    InvalidParameter {
        /// Relative parameter key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The parameter source failed.
    #[error("configuration source error: {0}")]
    Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConfigError {
    /// Wraps a parameter source failure.
    pub fn source(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Arc::new(err))
    }

    /// Creates an invalid-parameter error.
    #[must_use]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
