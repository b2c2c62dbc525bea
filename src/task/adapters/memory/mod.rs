//! In-memory adapters for tests and single-process runs.

mod notifier;
mod queue;
mod store;

pub use notifier::{InMemoryNotifier, PublishedEvent};
pub use queue::{DEFAULT_MAX_RECEIVE_COUNT, InMemoryWorkQueue};
pub use store::InMemoryTaskStore;
