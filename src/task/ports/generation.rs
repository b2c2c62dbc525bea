//! Generation port: turns a topic into markdown research notes.

use crate::config::GenerationSettings;
use crate::task::domain::Topic;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for generation calls.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Text-generation backend contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates markdown notes for `topic`.
    ///
    /// Implementations return non-empty text or an error.
    async fn generate(&self, settings: &GenerationSettings, topic: &Topic)
    -> GenerationResult<String>;
}

/// Errors returned by generation adapters.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The backend answered with a non-success HTTP status.
    #[error("generation backend returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The backend answered, but no known envelope yielded text.
    #[error("generation backend returned an empty or unrecognized response")]
    UnrecognizedResponse,

    /// The prompt template could not be rendered.
    #[error("failed to render generation prompt: {0}")]
    Prompt(String),

    /// Transport failure.
    #[error("generation transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl GenerationError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
