//! Parameter source backed by process environment variables.
//!
//! With prefix `NOTEWRIGHT__`, the variable `NOTEWRIGHT__GENERATION__API_KEY`
//! is listed as `NOTEWRIGHT__generation/api_key`, which the cache exposes as
//! `generation/api_key`.

use async_trait::async_trait;

use crate::config::{ConfigResult, ParameterPage, ParameterSource};

const SEGMENT_SEPARATOR: &str = "__";

/// Reads parameters from environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvParameterSource {
    snapshot: Option<Vec<(String, String)>>,
}

impl EnvParameterSource {
    /// Reads the live process environment on every listing.
    #[must_use]
    pub const fn new() -> Self {
        Self { snapshot: None }
    }

    /// Reads from a fixed set of variables instead of the environment.
    #[must_use]
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            snapshot: Some(vars.into_iter().collect()),
        }
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.snapshot
            .clone()
            .unwrap_or_else(|| std::env::vars().collect())
    }
}

fn normalize(rest: &str) -> String {
    rest.split(SEGMENT_SEPARATOR)
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ParameterSource for EnvParameterSource {
    async fn list_by_prefix(
        &self,
        prefix: &str,
        _page_token: Option<String>,
    ) -> ConfigResult<ParameterPage> {
        let mut entries: Vec<(String, String)> = self
            .vars()
            .into_iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(prefix)?;
                (!rest.is_empty()).then(|| (format!("{prefix}{}", normalize(rest)), value))
            })
            .collect();
        entries.sort();
        Ok(ParameterPage {
            entries,
            next_token: None,
        })
    }
}
