//! End-to-end tests over the in-memory adapters.
//!
//! Tests are organized into modules by functionality:
//! - `pipeline_tests`: create, enqueue, process and read back tasks
//! - `listing_tests`: newest-first pagination and deletion
//! - `http_tests`: the same flows through the axum router

mod in_memory {
    pub mod helpers;

    mod http_tests;
    mod listing_tests;
    mod pipeline_tests;
}
