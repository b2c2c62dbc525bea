//! Notifier that writes completion events to the log.

use async_trait::async_trait;
use tracing::info;

use crate::task::ports::{Notifier, NotifyResult};

/// Publishes events as structured log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, channel: &str, subject: &str, message: &str) -> NotifyResult<()> {
        info!(channel, subject, message, "notification published");
        Ok(())
    }
}
