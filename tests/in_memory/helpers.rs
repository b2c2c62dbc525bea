//! Shared wiring for in-memory integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::DefaultClock;
use notewright::config::{ConfigCache, GenerationSettings, adapters::InMemoryParameterSource};
use notewright::task::adapters::memory::{InMemoryNotifier, InMemoryTaskStore, InMemoryWorkQueue};
use notewright::task::domain::Topic;
use notewright::task::ports::{GenerationError, GenerationResult, Generator};
use notewright::task::services::TaskService;
use notewright::worker::{PollerConfig, QueuePoller, TaskWorker};

/// Namespace prefix used by every harness.
pub const PREFIX: &str = "/notewright/it/";
/// Queue URL configured for every harness.
pub const QUEUE_URL: &str = "memory://it-work";
/// Notification channel configured for every harness.
pub const NOTIFY_CHANNEL: &str = "memory://it-done";

/// Generator that answers from a per-topic script.
///
/// Topics without a scripted failure get `# {topic}` followed by a
/// fixed body.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    failures: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Makes generation for `topic` fail with `reason`.
    pub fn fail_topic(&self, topic: &str, reason: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(topic.to_owned(), reason.to_owned());
        }
    }

    /// Clears a scripted failure.
    pub fn heal_topic(&self, topic: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(topic);
        }
    }

    /// Returns every topic generation was requested for.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        _settings: &GenerationSettings,
        topic: &Topic,
    ) -> GenerationResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(topic.as_str().to_owned());
        }
        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|failures| failures.get(topic.as_str()).cloned());
        match failure {
            Some(reason) => Err(GenerationError::Http {
                status: 503,
                body: reason,
            }),
            None => Ok(format!("# {topic}\n\nKey facts and open questions.")),
        }
    }
}

/// Service type under test.
pub type Service =
    TaskService<InMemoryTaskStore, InMemoryWorkQueue, InMemoryParameterSource, DefaultClock>;

/// Worker type under test.
pub type Worker = TaskWorker<
    InMemoryTaskStore,
    ScriptedGenerator,
    InMemoryNotifier,
    InMemoryParameterSource,
    DefaultClock,
>;

/// Fully wired in-process pipeline.
pub struct Pipeline {
    pub source: InMemoryParameterSource,
    pub store: InMemoryTaskStore,
    pub queue: InMemoryWorkQueue,
    pub notifier: InMemoryNotifier,
    pub generator: Arc<ScriptedGenerator>,
    pub service: Service,
    pub poller: QueuePoller<InMemoryWorkQueue, Worker>,
}

impl Pipeline {
    /// Builds a pipeline with the queue, channel and API key configured.
    pub fn new() -> Self {
        let source = InMemoryParameterSource::new().with_page_size(2);
        for (key, value) in [
            ("queue_url", QUEUE_URL),
            ("notify_topic", NOTIFY_CHANNEL),
            ("generation/api_key", "sk-it"),
        ] {
            source
                .set(format!("{PREFIX}{key}"), value)
                .expect("seeding parameters should succeed");
        }

        let clock = Arc::new(DefaultClock);
        let config = Arc::new(ConfigCache::new(
            Arc::new(source.clone()),
            Arc::clone(&clock),
            PREFIX,
        ));
        let store = InMemoryTaskStore::new();
        let queue = InMemoryWorkQueue::new(QUEUE_URL).with_max_receive_count(2);
        let notifier = InMemoryNotifier::new();
        let generator = Arc::new(ScriptedGenerator::default());

        let service = TaskService::new(
            Arc::new(store.clone()),
            Arc::new(queue.clone()),
            Arc::clone(&config),
            Arc::clone(&clock),
        );
        let worker = TaskWorker::new(
            Arc::new(store.clone()),
            Arc::clone(&generator),
            Arc::new(notifier.clone()),
            config,
            clock,
        );
        let poller = QueuePoller::new(
            Arc::new(queue.clone()),
            Arc::new(worker),
            PollerConfig::default(),
        );

        Self {
            source,
            store,
            queue,
            notifier,
            generator,
            service,
            poller,
        }
    }

    /// Polls until the queue reports an empty batch.
    pub async fn drain(&self) {
        for _ in 0..16 {
            let handled = self.poller.poll_once().await.expect("poll should succeed");
            if handled == 0 {
                return;
            }
        }
    }
}
