//! Task aggregate root and related task lifecycle types.

use super::{ParseTaskStatusError, TaskDomainError, TaskId, Topic};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored when a failure carries no description.
const UNKNOWN_FAILURE: &str = "unknown failure";

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task has been created and is waiting for a worker.
    Queued,
    /// A worker is generating research notes.
    Processing,
    /// Research notes were generated and stored.
    Done,
    /// Generation or persistence failed.
    Error,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Processing => "PROCESSING",
            Self::Done => "DONE",
            Self::Error => "ERROR",
        }
    }

    /// Returns `true` when no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns `true` when the lifecycle permits moving to `target`.
    ///
    /// Nothing ever returns to `Queued` and nothing leaves `Done`.
    /// `Processing -> Processing` and `Error -> Processing` cover redelivery
    /// of the same work item; `Queued -> Error` covers a failed
    /// `Processing` write.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Queued | Self::Processing | Self::Error, Self::Processing)
                | (Self::Processing, Self::Done)
                | (Self::Queued | Self::Processing | Self::Error, Self::Error)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, ParseTaskStatusError> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "QUEUED" => Ok(Self::Queued),
            "PROCESSING" => Ok(Self::Processing),
            "DONE" => Ok(Self::Done),
            "ERROR" => Ok(Self::Error),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    topic: Topic,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    research_md: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted topic.
    pub topic: Topic,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted research notes.
    pub research_md: String,
    /// Persisted failure detail.
    pub error: Option<String>,
}

impl Task {
    /// Creates a new queued task for a topic.
    #[must_use]
    pub fn new(topic: Topic, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            topic,
            status: TaskStatus::Queued,
            created_at: timestamp,
            updated_at: timestamp,
            research_md: String::new(),
            error: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            topic: data.topic,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            research_md: data.research_md,
            error: data.error,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the researched topic.
    #[must_use]
    pub const fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the generated research notes; empty unless the task is done.
    #[must_use]
    pub fn research_md(&self) -> &str {
        &self.research_md
    }

    /// Returns the failure detail recorded with an `ERROR` status.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the list projection of this task.
    #[must_use]
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id,
            topic: self.topic.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Marks the task as picked up by a worker.
    ///
    /// Clears any failure detail left by an earlier attempt.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the task is
    /// already done.
    pub fn start_processing(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition_to(TaskStatus::Processing, clock)?;
        self.error = None;
        Ok(())
    }

    /// Stores generated research notes and marks the task done.
    ///
    /// Clears any failure detail left by an earlier attempt.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyResearchNotes`] when the notes are
    /// blank, or [`TaskDomainError::InvalidStateTransition`] when the task is
    /// not processing.
    pub fn complete(
        &mut self,
        research_md: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let notes = research_md.into();
        if notes.trim().is_empty() {
            return Err(TaskDomainError::EmptyResearchNotes(self.id));
        }
        self.transition_to(TaskStatus::Done, clock)?;
        self.research_md = notes;
        self.error = None;
        Ok(())
    }

    /// Records a failure and marks the task errored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the task is
    /// already done.
    pub fn fail(
        &mut self,
        error: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let detail = error.into();
        self.transition_to(TaskStatus::Error, clock)?;
        self.research_md.clear();
        self.error = Some(if detail.trim().is_empty() {
            UNKNOWN_FAILURE.to_owned()
        } else {
            detail
        });
        Ok(())
    }

    fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Projection of a task returned by list queries.
///
/// Never carries research notes or failure detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Task identifier.
    pub id: TaskId,
    /// Researched topic.
    pub topic: Topic,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}
