//! Adapter implementations for the parameter source port.

pub mod env;
pub mod memory;

pub use env::EnvParameterSource;
pub use memory::InMemoryParameterSource;
