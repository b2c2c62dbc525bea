//! TTL cache over a [`ParameterSource`].

use super::{ConfigMap, ConfigResult, ParameterSource};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Default time-to-live for cached configuration.
pub const DEFAULT_CONFIG_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct CachedConfig {
    map: Arc<ConfigMap>,
    fetched_at: DateTime<Utc>,
}

/// Process-wide configuration provider with TTL-based refresh.
///
/// Construct once per process and share by `Arc`. Concurrent callers that
/// observe an expired snapshot may each fetch; the last fetch wins.
pub struct ConfigCache<S, C>
where
    S: ParameterSource,
    C: Clock + Send + Sync,
{
    source: Arc<S>,
    clock: Arc<C>,
    prefix: String,
    ttl: TimeDelta,
    cached: RwLock<Option<CachedConfig>>,
}

impl<S, C> ConfigCache<S, C>
where
    S: ParameterSource,
    C: Clock + Send + Sync,
{
    /// Creates a cache over `source` for parameters under `prefix` with the
    /// default TTL.
    #[must_use]
    pub fn new(source: Arc<S>, clock: Arc<C>, prefix: impl Into<String>) -> Self {
        Self::with_ttl(source, clock, prefix, DEFAULT_CONFIG_TTL)
    }

    /// Creates a cache with an explicit TTL.
    #[must_use]
    pub fn with_ttl(
        source: Arc<S>,
        clock: Arc<C>,
        prefix: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            prefix: prefix.into(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            cached: RwLock::new(None),
        }
    }

    /// Returns the namespace prefix this cache reads.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the current configuration, refetching when the cached copy
    /// is missing or older than the TTL.
    ///
    /// # Errors
    ///
    /// Propagates source failures; a failed fetch is never cached.
    pub async fn get(&self) -> ConfigResult<Arc<ConfigMap>> {
        let now = self.clock.utc();
        if let Some(map) = self.fresh_snapshot(now).await {
            return Ok(map);
        }

        let map = Arc::new(self.fetch_all().await?);
        debug!(prefix = %self.prefix, entries = map.len(), "configuration refreshed");
        *self.cached.write().await = Some(CachedConfig {
            map: Arc::clone(&map),
            fetched_at: now,
        });
        Ok(map)
    }

    async fn fresh_snapshot(&self, now: DateTime<Utc>) -> Option<Arc<ConfigMap>> {
        let guard = self.cached.read().await;
        guard
            .as_ref()
            .filter(|cached| now.signed_duration_since(cached.fetched_at) < self.ttl)
            .map(|cached| Arc::clone(&cached.map))
    }

    /// Drains every page before returning so a partial listing is never
    /// cached.
    async fn fetch_all(&self) -> ConfigResult<ConfigMap> {
        let mut entries = Vec::new();
        let mut page_token = None;
        loop {
            let page = self
                .source
                .list_by_prefix(&self.prefix, page_token.take())
                .await?;
            entries.extend(
                page.entries
                    .into_iter()
                    .map(|(name, value)| (self.relative_key(&name), value)),
            );
            match page.next_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(ConfigMap::new(entries))
    }

    fn relative_key(&self, name: &str) -> String {
        name.strip_prefix(self.prefix.as_str())
            .unwrap_or(name)
            .trim_start_matches('/')
            .to_owned()
    }
}
