//! Immutable snapshot of fetched configuration entries.

use super::{ConfigError, ConfigResult};
use std::collections::BTreeMap;

/// Flat key/value configuration with keys relative to the cache prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigMap {
    entries: BTreeMap<String, String>,
}

impl ConfigMap {
    /// Creates a map from relative key/value pairs.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the trimmed value for `key`; blank values count as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Returns the value for `key` or a missing-parameter error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingParameter`] when the key is absent or
    /// blank.
    pub fn require(&self, key: &str) -> ConfigResult<&str> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingParameter(key.to_owned()))
    }

    /// Parses the value for `key`, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] when a present value does
    /// not parse.
    pub fn parse_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.parse::<T>()
                .map_err(|err| ConfigError::invalid(key, err.to_string()))
        })
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries were fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
