//! Long-running loop feeding queue batches to a [`BatchHandler`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::BatchHandler;
use crate::task::ports::{QueueResult, WorkQueueConsumer};

/// Polling behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Largest batch handed to the worker at once.
    pub batch_size: usize,
    /// Pause after an empty or failed poll.
    pub idle_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            idle_interval: Duration::from_millis(500),
        }
    }
}

/// Receives batches, hands them to the worker and settles them with the
/// worker's failure report.
pub struct QueuePoller<Q, H>
where
    Q: WorkQueueConsumer,
    H: BatchHandler,
{
    queue: Arc<Q>,
    handler: Arc<H>,
    config: PollerConfig,
}

impl<Q, H> QueuePoller<Q, H>
where
    Q: WorkQueueConsumer,
    H: BatchHandler,
{
    /// Creates a poller.
    #[must_use]
    pub const fn new(queue: Arc<Q>, handler: Arc<H>, config: PollerConfig) -> Self {
        Self {
            queue,
            handler,
            config,
        }
    }

    /// Receives and settles one batch, returning how many messages it held.
    ///
    /// # Errors
    ///
    /// Returns queue errors from receiving or acknowledging.
    pub async fn poll_once(&self) -> QueueResult<usize> {
        let batch = self.queue.receive_batch(self.config.batch_size.max(1)).await?;
        if batch.is_empty() {
            return Ok(0);
        }

        let report = self.handler.handle_batch(&batch).await;
        if !report.is_empty() {
            debug!(failed = ?report.failed_ids(), "batch has messages to redeliver");
        }
        self.queue.acknowledge(&batch, &report).await?;
        Ok(batch.len())
    }

    /// Polls until `shutdown` observes `true`.
    ///
    /// A batch in progress always completes before the loop exits.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(batch_size = self.config.batch_size, "queue poller started");
        while !*shutdown.borrow() {
            let handled = match self.poll_once().await {
                Ok(handled) => handled,
                Err(err) => {
                    warn!(error = %err, "queue poll failed");
                    0
                }
            };
            if handled == 0 {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    () = tokio::time::sleep(self.config.idle_interval) => {}
                }
            }
        }
        info!("queue poller stopped");
    }
}
