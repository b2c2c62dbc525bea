//! In-memory parameter source for tests and local runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::config::{ConfigError, ConfigResult, ParameterPage, ParameterSource};

const DEFAULT_PAGE_SIZE: usize = 10;

/// Thread-safe in-memory parameter store with paginated listing.
#[derive(Debug, Clone)]
pub struct InMemoryParameterSource {
    state: Arc<RwLock<BTreeMap<String, String>>>,
    page_size: usize,
    failing: Arc<AtomicBool>,
    failing_offset: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
}

impl Default for InMemoryParameterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryParameterSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            page_size: DEFAULT_PAGE_SIZE,
            failing: Arc::default(),
            failing_offset: Arc::new(AtomicUsize::new(usize::MAX)),
            list_calls: Arc::default(),
        }
    }

    /// Sets how many entries each page returns (at least one).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Stores a parameter under its absolute name.
    ///
    /// # Errors
    ///
    /// Returns a source error when lock acquisition fails.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> ConfigResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ConfigError::source(std::io::Error::other(err.to_string()))
        })?;
        state.insert(name.into(), value.into());
        Ok(())
    }

    /// Removes a parameter.
    ///
    /// # Errors
    ///
    /// Returns a source error when lock acquisition fails.
    pub fn remove(&self, name: &str) -> ConfigResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ConfigError::source(std::io::Error::other(err.to_string()))
        })?;
        state.remove(name);
        Ok(())
    }

    /// Makes every subsequent listing fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every page after the first `pages` of a listing fail, or
    /// clears that failure with `None`.
    pub fn fail_after_pages(&self, pages: Option<usize>) {
        let offset = pages.map_or(usize::MAX, |count| count.saturating_mul(self.page_size));
        self.failing_offset.store(offset, Ordering::SeqCst);
    }

    /// Returns how many pages have been requested.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParameterSource for InMemoryParameterSource {
    async fn list_by_prefix(
        &self,
        prefix: &str,
        page_token: Option<String>,
    ) -> ConfigResult<ParameterPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConfigError::source(std::io::Error::other(
                "parameter source unavailable",
            )));
        }

        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|err| ConfigError::invalid("page_token", err.to_string()))?,
            None => 0,
        };
        if offset >= self.failing_offset.load(Ordering::SeqCst) {
            return Err(ConfigError::source(std::io::Error::other(
                "parameter source dropped the listing",
            )));
        }

        let state = self.state.read().map_err(|err| {
            ConfigError::source(std::io::Error::other(err.to_string()))
        })?;
        let mut matching = state
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .skip(offset);
        let entries: Vec<(String, String)> = matching
            .by_ref()
            .take(self.page_size)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let next_token = matching
            .next()
            .map(|_| (offset + entries.len()).to_string());

        Ok(ParameterPage {
            entries,
            next_token,
        })
    }
}
