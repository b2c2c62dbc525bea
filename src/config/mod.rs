//! Operational configuration for notewright.
//!
//! Parameters live in an external hierarchical store and are read through a
//! [`ConfigCache`] that memoizes the full listing under a namespace prefix
//! for a fixed time-to-live:
//!
//! - Port contract in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Typed settings views in [`settings`]

pub mod adapters;
mod cache;
mod error;
mod map;
pub mod ports;
pub mod settings;

pub use cache::{ConfigCache, DEFAULT_CONFIG_TTL};
pub use error::{ConfigError, ConfigResult};
pub use map::ConfigMap;
pub use ports::{ParameterPage, ParameterSource};
pub use settings::{GenerationSettings, IdentitySettings, ServiceSettings, WorkerSettings};

#[cfg(test)]
mod tests;
