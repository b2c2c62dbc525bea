//! Store port for task persistence, lookup and newest-first listing.

use crate::task::domain::{Task, TaskId, TaskSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Native position in the store's newest-first ordering view.
///
/// Listing resumes strictly after this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreKey {
    /// Creation timestamp of the last returned task.
    pub created_at: DateTime<Utc>,
    /// Identifier of the last returned task.
    pub id: TaskId,
}

impl StoreKey {
    /// Returns the ordering key of a task summary.
    #[must_use]
    pub const fn of(summary: &TaskSummary) -> Self {
        Self {
            created_at: summary.created_at,
            id: summary.id,
        }
    }
}

/// One page of the newest-first ordering view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorePage {
    /// Projected tasks, newest first.
    pub items: Vec<TaskSummary>,
    /// Key to resume from, `None` when the view is exhausted.
    pub next_key: Option<StoreKey>,
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task, failing rather than overwriting.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task ID already
    /// exists.
    async fn insert(&self, task: &Task) -> TaskStoreResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Persists status and body changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskStoreResult<()>;

    /// Removes a task; removing an absent task succeeds.
    async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Returns up to `limit` projected tasks ordered by creation time,
    /// newest first, resuming strictly after `after` when given.
    async fn list_newest_first(
        &self,
        limit: usize,
        after: Option<StoreKey>,
    ) -> TaskStoreResult<StorePage>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
