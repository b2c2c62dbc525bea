//! Unit tests for the batch worker and queue poller.


use std::sync::Arc;

use crate::config::{ConfigCache, adapters::InMemoryParameterSource};
use crate::task::{
    adapters::memory::{InMemoryNotifier, InMemoryTaskStore},
    domain::{Task, Topic, WorkItem},
    ports::{Generator, QueueMessage, TaskStore},
};
use crate::test_support::SteppingClock;
use mockable::Clock;

use super::TaskWorker;

pub(super) const PREFIX: &str = "/notewright/test/";

pub(super) type TestWorker<G> = TaskWorker<
    InMemoryTaskStore,
    G,
    InMemoryNotifier,
    InMemoryParameterSource,
    SteppingClock,
>;

/// Shared collaborators for worker tests.
pub(super) struct WorkerHarness {
    pub store: InMemoryTaskStore,
    pub notifier: InMemoryNotifier,
    pub source: InMemoryParameterSource,
    pub clock: Arc<SteppingClock>,
}

impl WorkerHarness {
    pub fn new() -> Self {
        let source = InMemoryParameterSource::new();
        source
            .set(format!("{PREFIX}generation/api_key"), "sk-test")
            .expect("seeding api key should succeed");
        source
            .set(format!("{PREFIX}notify_topic"), "memory://done")
            .expect("seeding notify topic should succeed");
        Self {
            store: InMemoryTaskStore::new(),
            notifier: InMemoryNotifier::new(),
            source,
            clock: Arc::new(SteppingClock::new()),
        }
    }

    pub fn worker<G: Generator>(&self, generator: G) -> TestWorker<G> {
        let config = ConfigCache::new(
            Arc::new(self.source.clone()),
            Arc::clone(&self.clock),
            PREFIX,
        );
        TaskWorker::new(
            Arc::new(self.store.clone()),
            Arc::new(generator),
            Arc::new(self.notifier.clone()),
            Arc::new(config),
            Arc::clone(&self.clock),
        )
    }

    pub async fn queued_task(&self, topic: &str) -> Task {
        let task = Task::new(
            Topic::new(topic).expect("topic should be valid"),
            &*self.clock,
        );
        self.store
            .insert(&task)
            .await
            .expect("seeding task should succeed");
        task
    }

    pub fn message_for(&self, task: &Task, message_id: &str) -> QueueMessage {
        let item = WorkItem::for_task(task, self.clock.utc());
        QueueMessage {
            message_id: message_id.to_owned(),
            body: serde_json::to_string(&item).expect("work item should serialize"),
            receive_count: 1,
        }
    }
}
