//! Batch processor driving tasks from `PROCESSING` to `DONE` or `ERROR`.

use async_trait::async_trait;
use futures::future::join_all;
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{ConfigCache, ConfigError, ParameterSource, WorkerSettings};
use crate::task::{
    domain::{Task, TaskDomainError, TaskId, TaskStatus, WorkItem, WorkItemError},
    ports::{
        BatchItemFailure, BatchReport, GenerationError, Generator, Notifier, NotifyError,
        QueueMessage, TaskStore, TaskStoreError,
    },
};

/// Longest subject accepted by notification channels.
const MAX_SUBJECT_CHARS: usize = 100;

/// Handles one delivered batch and reports which messages failed.
#[async_trait]
pub trait BatchHandler: Send + Sync {
    /// Processes `messages`; never fails as a whole.
    async fn handle_batch(&self, messages: &[QueueMessage]) -> BatchReport;
}

/// Errors that fail a single work item.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The message body is not a usable work item.
    #[error(transparent)]
    MalformedItem(#[from] WorkItemError),
    /// The referenced task does not exist.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    /// The lifecycle rejected a transition.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// A store write or read failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
    /// The generation backend failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

/// Pipeline-side worker for research tasks.
pub struct TaskWorker<S, G, N, P, C>
where
    S: TaskStore,
    G: Generator,
    N: Notifier,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    generator: Arc<G>,
    notifier: Arc<N>,
    config: Arc<ConfigCache<P, C>>,
    clock: Arc<C>,
}

impl<S, G, N, P, C> TaskWorker<S, G, N, P, C>
where
    S: TaskStore,
    G: Generator,
    N: Notifier,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    /// Creates a worker.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        generator: Arc<G>,
        notifier: Arc<N>,
        config: Arc<ConfigCache<P, C>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            generator,
            notifier,
            config,
            clock,
        }
    }

    /// Processes a batch and returns the messages the transport must
    /// redeliver.
    ///
    /// Without usable configuration every message is reported failed and
    /// nothing is written. Otherwise each message is processed
    /// independently and concurrently.
    pub async fn process_batch(&self, messages: &[QueueMessage]) -> BatchReport {
        let settings = match self.load_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                error!(error = %err, batch_size = messages.len(), "worker configuration unavailable; failing batch");
                return BatchReport {
                    failures: messages
                        .iter()
                        .map(|message| BatchItemFailure {
                            message_id: message.message_id.clone(),
                            reason: err.to_string(),
                        })
                        .collect(),
                };
            }
        };

        let outcomes = join_all(
            messages
                .iter()
                .map(|message| self.process_message(&settings, message)),
        )
        .await;

        let failures: Vec<BatchItemFailure> = messages
            .iter()
            .zip(outcomes)
            .filter_map(|(message, outcome)| {
                outcome.err().map(|err| BatchItemFailure {
                    message_id: message.message_id.clone(),
                    reason: err.to_string(),
                })
            })
            .collect();
        info!(
            batch_size = messages.len(),
            failed = failures.len(),
            "batch processed"
        );
        BatchReport { failures }
    }

    async fn load_settings(&self) -> Result<WorkerSettings, ConfigError> {
        WorkerSettings::from_config(&*self.config.get().await?)
    }

    async fn process_message(
        &self,
        settings: &WorkerSettings,
        message: &QueueMessage,
    ) -> Result<(), WorkerError> {
        let result = self.run_pipeline(settings, message).await;
        if let Err(err) = &result {
            warn!(
                message_id = %message.message_id,
                receive_count = message.receive_count,
                error = %err,
                "work item failed"
            );
            if !matches!(err, WorkerError::MalformedItem(_)) {
                self.record_failure(&message.body, err).await;
            }
        }
        result
    }

    async fn run_pipeline(
        &self,
        settings: &WorkerSettings,
        message: &QueueMessage,
    ) -> Result<(), WorkerError> {
        let item = WorkItem::from_json(&message.body, self.clock.utc())?;
        let mut task = self
            .store
            .find_by_id(item.id)
            .await?
            .ok_or(WorkerError::TaskNotFound(item.id))?;
        if task.status() == TaskStatus::Done {
            info!(task_id = %item.id, "task already done; acknowledging duplicate delivery");
            return Ok(());
        }

        task.start_processing(&*self.clock)?;
        self.store.update(&task).await?;

        let notes = self
            .generator
            .generate(&settings.generation, &item.topic)
            .await?;
        task.complete(notes, &*self.clock)?;
        self.store.update(&task).await?;
        info!(task_id = %task.id(), bytes = task.research_md().len(), "task done");

        if let Some(channel) = settings.notify_topic.as_deref() {
            if let Err(err) = self.notify_completion(channel, &task).await {
                warn!(task_id = %task.id(), error = %err, "completion notification failed");
            }
        }
        Ok(())
    }

    async fn notify_completion(&self, channel: &str, task: &Task) -> Result<(), NotifyError> {
        let subject: String = format!("Research ready: {}", task.topic())
            .chars()
            .take(MAX_SUBJECT_CHARS)
            .collect();
        let message = json!({
            "id": task.id(),
            "topic": task.topic(),
            "status": task.status(),
        })
        .to_string();
        self.notifier.publish(channel, &subject, &message).await
    }

    /// Best-effort compensating write; failures are only logged.
    async fn record_failure(&self, body: &str, cause: &WorkerError) {
        let Some(task_id) = WorkItem::recover_task_id(body) else {
            warn!("no task id recoverable from failed work item");
            return;
        };
        if let Err(err) = self.mark_errored(task_id, &cause.to_string()).await {
            error!(task_id = %task_id, error = %err, "failed to record task error");
        }
    }

    async fn mark_errored(&self, task_id: TaskId, detail: &str) -> Result<(), WorkerError> {
        let mut task = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or(WorkerError::TaskNotFound(task_id))?;
        task.fail(detail, &*self.clock)?;
        self.store.update(&task).await?;
        Ok(())
    }
}

#[async_trait]
impl<S, G, N, P, C> BatchHandler for TaskWorker<S, G, N, P, C>
where
    S: TaskStore,
    G: Generator,
    N: Notifier,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    async fn handle_batch(&self, messages: &[QueueMessage]) -> BatchReport {
        self.process_batch(messages).await
    }
}
