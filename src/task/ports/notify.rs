//! Notification port for completion events.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Fire-and-forget publication of events to a notification channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publishes `message` under `subject` to the channel named `channel`.
    async fn publish(&self, channel: &str, subject: &str, message: &str) -> NotifyResult<()>;
}

/// Errors returned by notification adapters.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// The channel does not exist.
    #[error("unknown notification channel: {0}")]
    UnknownChannel(String),

    /// Transport failure.
    #[error("notification transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifyError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
