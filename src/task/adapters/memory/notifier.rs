//! In-memory notifier that records published events.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::task::ports::{Notifier, NotifyError, NotifyResult};

/// Event captured by [`InMemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEvent {
    /// Channel the event was published to.
    pub channel: String,
    /// Event subject.
    pub subject: String,
    /// Event body.
    pub message: String,
}

/// Thread-safe notifier that keeps every published event.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    events: Arc<Mutex<Vec<PublishedEvent>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryNotifier {
    /// Creates a notifier with no recorded events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent publish fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the events published so far.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn events(&self) -> NotifyResult<Vec<PublishedEvent>> {
        let events = self
            .events
            .lock()
            .map_err(|err| NotifyError::transport(std::io::Error::other(err.to_string())))?;
        Ok(events.clone())
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn publish(&self, channel: &str, subject: &str, message: &str) -> NotifyResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::transport(std::io::Error::other(
                "notification channel unavailable",
            )));
        }
        self.events
            .lock()
            .map_err(|err| NotifyError::transport(std::io::Error::other(err.to_string())))?
            .push(PublishedEvent {
                channel: channel.to_owned(),
                subject: subject.to_owned(),
                message: message.to_owned(),
            });
        Ok(())
    }
}
