//! Queue ports: publishing work items and consuming them in batches.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Producer side of the work queue.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Sends a JSON payload to the queue at `queue_url`.
    ///
    /// Returns the transport-assigned message identifier.
    async fn send(&self, queue_url: &str, payload: &str) -> QueueResult<String>;
}

/// Message delivered to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Transport-assigned message identifier.
    pub message_id: String,
    /// Raw message body.
    pub body: String,
    /// Number of times this message has been delivered, starting at one.
    pub receive_count: u32,
}

/// A message the worker could not fully handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemFailure {
    /// Identifier of the failed message.
    pub message_id: String,
    /// Human-readable failure description.
    pub reason: String,
}

/// Batch failure report returned by the worker.
///
/// Messages not named here are fully handled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    /// Messages the transport must redeliver.
    pub failures: Vec<BatchItemFailure>,
}

impl BatchReport {
    /// Returns `true` when the report names `message_id`.
    #[must_use]
    pub fn names(&self, message_id: &str) -> bool {
        self.failures
            .iter()
            .any(|failure| failure.message_id == message_id)
    }

    /// Returns the identifiers of the failed messages.
    #[must_use]
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|failure| failure.message_id.as_str())
            .collect()
    }

    /// Returns `true` when every message was handled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Consumer side of the work queue.
#[async_trait]
pub trait WorkQueueConsumer: Send + Sync {
    /// Receives up to `max_messages` visible messages.
    async fn receive_batch(&self, max_messages: usize) -> QueueResult<Vec<QueueMessage>>;

    /// Settles a delivered batch: messages named in `report` are made
    /// visible again, all others are deleted.
    async fn acknowledge(&self, delivered: &[QueueMessage], report: &BatchReport)
    -> QueueResult<()>;
}

/// Errors returned by queue adapters.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The queue URL does not name a known queue.
    #[error("unknown queue: {0}")]
    UnknownQueue(String),

    /// Transport failure.
    #[error("queue transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl QueueError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
