//! Port contract for hierarchical parameter sources.

use super::ConfigResult;
use async_trait::async_trait;

/// One page of parameters returned by a source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterPage {
    /// Absolute parameter names and their (decrypted) values.
    pub entries: Vec<(String, String)>,
    /// Token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

/// Hierarchical parameter store listing flat key/value entries by prefix.
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Lists one page of parameters whose names start with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`super::ConfigError::Source`] when the store cannot be read.
    async fn list_by_prefix(
        &self,
        prefix: &str,
        page_token: Option<String>,
    ) -> ConfigResult<ParameterPage>;
}
