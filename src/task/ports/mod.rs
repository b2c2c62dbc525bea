//! Port contracts for the research task pipeline.
//!
//! Ports define infrastructure-agnostic interfaces used by the task service
//! and the worker.

pub mod generation;
pub mod notify;
pub mod queue;
pub mod store;

pub use generation::{GenerationError, GenerationResult, Generator};
pub use notify::{NotifyError, NotifyResult, Notifier};
pub use queue::{
    BatchItemFailure, BatchReport, QueueError, QueueMessage, QueueResult, WorkQueue,
    WorkQueueConsumer,
};
pub use store::{StoreKey, StorePage, TaskStore, TaskStoreError, TaskStoreResult};
