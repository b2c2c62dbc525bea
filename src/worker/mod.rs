//! Pipeline-side processing of queued research tasks.
//!
//! - [`TaskWorker`] drives each work item in a batch through the task
//!   lifecycle and reports the messages that must be redelivered.
//! - [`QueuePoller`] feeds batches from a consumable queue to a
//!   [`BatchHandler`] and settles them with the failure report.

mod poller;
mod processor;

pub use poller::{PollerConfig, QueuePoller};
pub use processor::{BatchHandler, TaskWorker, WorkerError};

#[cfg(test)]
mod tests;
