//! Domain model for the research task lifecycle.
//!
//! The task domain models topic validation, the status state machine, the
//! list projection and the queue work item while keeping all infrastructure
//! concerns outside of the domain boundary.

mod error;
mod ids;
mod task;
mod work_item;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, Topic};
pub use task::{PersistedTaskData, Task, TaskStatus, TaskSummary};
pub use work_item::{RESEARCH_TASK_TYPE, WorkItem, WorkItemError};
