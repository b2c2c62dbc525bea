//! Service layer for creating, listing, reading and deleting tasks.

use crate::config::{ConfigCache, ConfigError, ParameterSource, ServiceSettings};
use crate::task::{
    domain::{Task, TaskDomainError, TaskId, TaskStatus, TaskSummary, Topic, WorkItem},
    ports::{QueueError, TaskStore, TaskStoreError, WorkQueue},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cursor::{decode_cursor, encode_cursor};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 25;
/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Request parameters for listing tasks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListTasksRequest {
    limit: Option<usize>,
    cursor: Option<String>,
}

impl ListTasksRequest {
    /// Creates a request for the first page with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resumes from a cursor returned by a previous page.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Returns the effective page size, clamped to `1..=MAX_PAGE_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }
}

/// Response returned after a task is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    /// New task identifier.
    pub id: TaskId,
    /// Normalized topic.
    pub topic: Topic,
    /// Initial status, always `QUEUED`.
    pub status: TaskStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for CreatedTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            topic: task.topic().clone(),
            status: task.status(),
            created_at: task.created_at(),
        }
    }
}

/// One page of projected tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPage {
    /// Tasks ordered newest first.
    pub items: Vec<TaskSummary>,
    /// Opaque cursor for the next page, `None` on the last page.
    pub cursor: Option<String>,
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The pagination cursor was not issued by this service.
    #[error("invalid pagination cursor")]
    InvalidCursor,
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Why a work item could not be published.
#[derive(Debug, Error)]
enum EnqueueFailure {
    #[error("failed to encode work item: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Front-door orchestration of the task lifecycle.
pub struct TaskService<S, Q, P, C>
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    queue: Arc<Q>,
    config: Arc<ConfigCache<P, C>>,
    clock: Arc<C>,
}

impl<S, Q, P, C> Clone for TaskService<S, Q, P, C>
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            queue: Arc::clone(&self.queue),
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, Q, P, C> TaskService<S, Q, P, C>
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        queue: Arc<Q>,
        config: Arc<ConfigCache<P, C>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            queue,
            config,
            clock,
        }
    }

    /// Returns the shared configuration cache.
    #[must_use]
    pub const fn config(&self) -> &Arc<ConfigCache<P, C>> {
        &self.config
    }

    /// Returns the service clock.
    #[must_use]
    pub const fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    /// Creates a queued task and best-effort publishes its work item.
    ///
    /// Publishing is skipped when no queue is configured; a failed publish
    /// is logged and the task stays `QUEUED`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] for a blank topic (nothing is
    /// written), [`TaskServiceError::Configuration`] when configuration
    /// cannot be loaded, or [`TaskServiceError::Store`] when the conditional
    /// write fails.
    pub async fn create(&self, topic: impl Into<String> + Send) -> TaskServiceResult<CreatedTask> {
        let topic = Topic::new(topic)?;
        let settings = ServiceSettings::from_config(&*self.config.get().await?);

        let task = Task::new(topic, &*self.clock);
        self.store.insert(&task).await?;
        info!(task_id = %task.id(), topic = %task.topic(), "task created");

        match settings.queue_url {
            Some(queue_url) => {
                if let Err(err) = self.publish_work_item(&queue_url, &task).await {
                    warn!(task_id = %task.id(), error = %err, "failed to enqueue work item; task stays queued");
                }
            }
            None => debug!(task_id = %task.id(), "no queue configured; skipping enqueue"),
        }

        Ok(CreatedTask::from(&task))
    }

    async fn publish_work_item(&self, queue_url: &str, task: &Task) -> Result<(), EnqueueFailure> {
        let payload = serde_json::to_string(&WorkItem::for_task(task, self.clock.utc()))?;
        let message_id = self.queue.send(queue_url, &payload).await?;
        debug!(task_id = %task.id(), message_id = %message_id, "work item enqueued");
        Ok(())
    }

    /// Lists projected tasks newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::InvalidCursor`] for a foreign cursor or
    /// [`TaskServiceError::Store`] when the query fails.
    pub async fn list(&self, request: ListTasksRequest) -> TaskServiceResult<TaskPage> {
        let limit = request.effective_limit();
        let after = request
            .cursor
            .as_deref()
            .map(|token| decode_cursor(token).ok_or(TaskServiceError::InvalidCursor))
            .transpose()?;

        let page = self.store.list_newest_first(limit, after).await?;
        Ok(TaskPage {
            items: page.items,
            cursor: page.next_key.as_ref().map(encode_cursor),
        })
    }

    /// Returns the full task record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn get(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Deletes a task; deleting an absent task succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Store`] when the delete fails.
    pub async fn delete(&self, id: TaskId) -> TaskServiceResult<()> {
        self.store.delete(id).await?;
        info!(task_id = %id, "task deleted");
        Ok(())
    }
}
