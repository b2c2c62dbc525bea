//! Research task lifecycle.
//!
//! A task records a topic a caller wants researched, moves from `QUEUED`
//! through `PROCESSING` to `DONE` or `ERROR`, and carries the generated
//! markdown notes once done. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The front-door service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
