//! Notewright: asynchronous topic-to-research-notes pipeline.
//!
//! Callers submit a topic over HTTP and receive a task identifier at once;
//! a worker later generates markdown research notes for the topic, stores
//! them on the task and announces completion.
//!
//! # Architecture
//!
//! Notewright follows hexagonal architecture principles:
//!
//! - **Domain**: task lifecycle and work item types with no infrastructure
//!   dependencies
//! - **Ports**: async traits for the store, queue, notifier, generation
//!   backend and configuration source
//! - **Adapters**: in-memory, environment, logging and HTTP implementations
//!
//! # Modules
//!
//! - [`config`]: TTL-cached operational configuration
//! - [`identity`]: advisory bearer-token identity extraction
//! - [`task`]: task domain, ports, adapters and the front-door service
//! - [`worker`]: batch processing of queued work items
//! - [`api`]: axum router exposing the task service

pub mod api;
pub mod config;
pub mod identity;
pub mod task;
pub mod worker;

#[cfg(test)]
mod test_support;
