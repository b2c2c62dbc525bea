//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The topic is empty after trimming.
    #[error("topic must not be empty")]
    EmptyTopic,

    /// The task identifier is not a valid UUID.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),

    /// Generated research notes were empty after trimming.
    #[error("generated research notes for task {0} are empty")]
    EmptyResearchNotes(TaskId),

    /// The requested lifecycle transition is not permitted.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
