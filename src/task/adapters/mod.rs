//! Adapter implementations for the task pipeline ports.

pub mod http;
pub mod log;
pub mod memory;

pub use http::HttpGenerator;
pub use log::LogNotifier;
