//! Typed views over the configuration snapshot.

use super::{ConfigMap, ConfigResult};
use std::fmt;

/// Well-known configuration keys, relative to the cache prefix.
pub mod keys {
    /// Queue that receives work items; publishing is skipped when absent.
    pub const QUEUE_URL: &str = "queue_url";
    /// Channel for completion events; notifications are skipped when absent.
    pub const NOTIFY_TOPIC: &str = "notify_topic";
    /// Generation backend credential.
    pub const GENERATION_API_KEY: &str = "generation/api_key";
    /// Generation model name.
    pub const GENERATION_MODEL: &str = "generation/model";
    /// Generation endpoint URL.
    pub const GENERATION_BASE_URL: &str = "generation/base_url";
    /// Upper bound on generated output tokens.
    pub const GENERATION_MAX_TOKENS: &str = "generation/max_tokens";
    /// Identity pool identifier, e.g. `eu-west-1_AbCdEf`.
    pub const IDENTITY_USER_POOL_ID: &str = "identity/user_pool_id";
    /// Client identifier expected in the `aud` claim.
    pub const IDENTITY_CLIENT_ID: &str = "identity/client_id";
    /// Region of the identity pool; derived from the pool id when absent.
    pub const IDENTITY_REGION: &str = "identity/region";
}

const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/responses";
const DEFAULT_MAX_TOKENS: u32 = 4_000;

/// Settings the task service reads on each request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceSettings {
    /// Queue URL for work items.
    pub queue_url: Option<String>,
}

impl ServiceSettings {
    /// Reads service settings; every key is optional.
    #[must_use]
    pub fn from_config(config: &ConfigMap) -> Self {
        Self {
            queue_url: config.get(keys::QUEUE_URL).map(str::to_owned),
        }
    }
}

/// Settings for the generation backend.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Bearer credential.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Endpoint URL.
    pub base_url: String,
    /// Output token limit.
    pub max_tokens: u32,
}

impl GenerationSettings {
    /// Reads generation settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the API key is missing or the
    /// token limit is not a number.
    pub fn from_config(config: &ConfigMap) -> ConfigResult<Self> {
        Ok(Self {
            api_key: config.require(keys::GENERATION_API_KEY)?.to_owned(),
            model: config
                .get(keys::GENERATION_MODEL)
                .unwrap_or(DEFAULT_MODEL)
                .to_owned(),
            base_url: config
                .get(keys::GENERATION_BASE_URL)
                .unwrap_or(DEFAULT_BASE_URL)
                .to_owned(),
            max_tokens: config.parse_or(keys::GENERATION_MAX_TOKENS, DEFAULT_MAX_TOKENS)?,
        })
    }
}

impl fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Settings the worker reads at the start of each batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Channel for completion events.
    pub notify_topic: Option<String>,
    /// Generation backend settings.
    pub generation: GenerationSettings,
}

impl WorkerSettings {
    /// Reads worker settings.
    ///
    /// # Errors
    ///
    /// Propagates [`GenerationSettings::from_config`] failures.
    pub fn from_config(config: &ConfigMap) -> ConfigResult<Self> {
        Ok(Self {
            notify_topic: config.get(keys::NOTIFY_TOPIC).map(str::to_owned),
            generation: GenerationSettings::from_config(config)?,
        })
    }
}

/// Identity provider settings used to check bearer token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    /// Identity pool identifier.
    pub user_pool_id: String,
    /// Expected audience.
    pub client_id: String,
    /// Pool region.
    pub region: String,
}

impl IdentitySettings {
    /// Reads identity settings; `None` when identity is not configured.
    #[must_use]
    pub fn from_config(config: &ConfigMap) -> Option<Self> {
        let user_pool_id = config.get(keys::IDENTITY_USER_POOL_ID)?;
        let client_id = config.get(keys::IDENTITY_CLIENT_ID)?;
        let region = config.get(keys::IDENTITY_REGION).or_else(|| {
            user_pool_id
                .split_once('_')
                .map(|(region, _)| region)
                .filter(|region| !region.is_empty())
        })?;
        Some(Self {
            user_pool_id: user_pool_id.to_owned(),
            client_id: client_id.to_owned(),
            region: region.to_owned(),
        })
    }

    /// Returns the issuer URL tokens from this pool must carry.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }
}
