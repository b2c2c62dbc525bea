//! In-memory work queue with redelivery and dead-lettering.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::warn;
use uuid::Uuid;

use crate::task::ports::{
    BatchReport, QueueError, QueueMessage, QueueResult, WorkQueue, WorkQueueConsumer,
};

/// Default number of deliveries before a message is dead-lettered.
pub const DEFAULT_MAX_RECEIVE_COUNT: u32 = 3;

/// Thread-safe in-memory queue addressed by a single URL.
#[derive(Debug, Clone)]
pub struct InMemoryWorkQueue {
    url: String,
    max_receive_count: u32,
    state: Arc<Mutex<InMemoryQueueState>>,
}

#[derive(Debug, Default)]
struct InMemoryQueueState {
    visible: VecDeque<QueueMessage>,
    in_flight: HashMap<String, QueueMessage>,
    dead_letters: Vec<QueueMessage>,
}

impl InMemoryWorkQueue {
    /// Creates an empty queue reachable at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_receive_count: DEFAULT_MAX_RECEIVE_COUNT,
            state: Arc::default(),
        }
    }

    /// Sets how many deliveries a message gets before dead-lettering.
    #[must_use]
    pub fn with_max_receive_count(mut self, max_receive_count: u32) -> Self {
        self.max_receive_count = max_receive_count.max(1);
        self
    }

    /// Returns the URL this queue accepts.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the bodies of messages waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn visible_bodies(&self) -> QueueResult<Vec<String>> {
        let state = self.lock()?;
        Ok(state
            .visible
            .iter()
            .map(|message| message.body.clone())
            .collect())
    }

    /// Returns messages that exhausted their deliveries.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn dead_letters(&self) -> QueueResult<Vec<QueueMessage>> {
        Ok(self.lock()?.dead_letters.clone())
    }

    fn lock(&self) -> QueueResult<std::sync::MutexGuard<'_, InMemoryQueueState>> {
        self.state
            .lock()
            .map_err(|err| QueueError::transport(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn send(&self, queue_url: &str, payload: &str) -> QueueResult<String> {
        if queue_url != self.url {
            return Err(QueueError::UnknownQueue(queue_url.to_owned()));
        }
        let message_id = Uuid::new_v4().to_string();
        self.lock()?.visible.push_back(QueueMessage {
            message_id: message_id.clone(),
            body: payload.to_owned(),
            receive_count: 0,
        });
        Ok(message_id)
    }
}

#[async_trait]
impl WorkQueueConsumer for InMemoryWorkQueue {
    async fn receive_batch(&self, max_messages: usize) -> QueueResult<Vec<QueueMessage>> {
        let mut state = self.lock()?;
        let count = max_messages.min(state.visible.len());
        let batch: Vec<QueueMessage> = state
            .visible
            .drain(..count)
            .map(|mut message| {
                message.receive_count = message.receive_count.saturating_add(1);
                message
            })
            .collect();
        for message in &batch {
            state
                .in_flight
                .insert(message.message_id.clone(), message.clone());
        }
        Ok(batch)
    }

    async fn acknowledge(
        &self,
        delivered: &[QueueMessage],
        report: &BatchReport,
    ) -> QueueResult<()> {
        let mut state = self.lock()?;
        for message in delivered {
            let Some(in_flight) = state.in_flight.remove(&message.message_id) else {
                continue;
            };
            if !report.names(&in_flight.message_id) {
                continue;
            }
            if in_flight.receive_count >= self.max_receive_count {
                warn!(
                    message_id = %in_flight.message_id,
                    receive_count = in_flight.receive_count,
                    "message exhausted its deliveries; moving to dead letters"
                );
                state.dead_letters.push(in_flight);
            } else {
                state.visible.push_back(in_flight);
            }
        }
        Ok(())
    }
}
