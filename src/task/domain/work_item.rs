//! Work item published to the queue when a task is created.

use super::{Task, TaskId, Topic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Task type carried by every research work item.
pub const RESEARCH_TASK_TYPE: &str = "research";

/// Message body that triggers asynchronous processing of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Task to process.
    pub id: TaskId,
    /// Topic to research.
    pub topic: Topic,
    /// When the work was requested.
    pub requested_at: DateTime<Utc>,
    /// Kind of work requested.
    pub task_type: String,
}

/// Errors raised while decoding a work item body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkItemError {
    /// The body is not a JSON object.
    #[error("work item body is not valid JSON: {0}")]
    InvalidJson(String),

    /// A required field is absent or blank.
    #[error("work item is missing required field '{0}'")]
    MissingField(&'static str),

    /// The `id` field is not a task identifier.
    #[error("work item has invalid id '{0}'")]
    InvalidId(String),
}

/// Lenient view of a body; fields are validated after decoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorkItem {
    id: Option<String>,
    topic: Option<String>,
    requested_at: Option<DateTime<Utc>>,
    task_type: Option<String>,
}

impl WorkItem {
    /// Builds the work item for a freshly created task.
    #[must_use]
    pub fn for_task(task: &Task, requested_at: DateTime<Utc>) -> Self {
        Self {
            id: task.id(),
            topic: task.topic().clone(),
            requested_at,
            task_type: RESEARCH_TASK_TYPE.to_owned(),
        }
    }

    /// Decodes a queue message body.
    ///
    /// Missing `requestedAt` or `taskType` fall back to `fallback_time` and
    /// [`RESEARCH_TASK_TYPE`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemError`] when the body is not JSON, or `id`/`topic`
    /// are missing, blank or malformed.
    pub fn from_json(body: &str, fallback_time: DateTime<Utc>) -> Result<Self, WorkItemError> {
        let raw: RawWorkItem =
            serde_json::from_str(body).map_err(|err| WorkItemError::InvalidJson(err.to_string()))?;

        let raw_id = raw
            .id
            .filter(|value| !value.trim().is_empty())
            .ok_or(WorkItemError::MissingField("id"))?;
        let topic = raw
            .topic
            .and_then(|value| Topic::new(value).ok())
            .ok_or(WorkItemError::MissingField("topic"))?;
        let id = raw_id
            .parse::<TaskId>()
            .map_err(|_| WorkItemError::InvalidId(raw_id.clone()))?;

        Ok(Self {
            id,
            topic,
            requested_at: raw.requested_at.unwrap_or(fallback_time),
            task_type: raw
                .task_type
                .unwrap_or_else(|| RESEARCH_TASK_TYPE.to_owned()),
        })
    }

    /// Recovers whatever task identifier a possibly malformed body carries.
    #[must_use]
    pub fn recover_task_id(body: &str) -> Option<TaskId> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value.get("id")?.as_str()?.parse().ok()
    }
}
