//! HTTP surface for the task service.
//!
//! [`router`] assembles the axum application: the `/tasks` routes, a
//! fallback that answers `OPTIONS` anywhere and 404s unknown routes or
//! methods, permissive CORS and request tracing.

mod error;
mod handlers;

pub use error::ApiError;

use axum::Router;
use axum::routing::get;
use mockable::Clock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ParameterSource;
use crate::task::ports::{TaskStore, WorkQueue};
use crate::task::services::TaskService;

/// Builds the application router around a shared [`TaskService`].
pub fn router<S, Q, P, C>(service: TaskService<S, Q, P, C>) -> Router
where
    S: TaskStore + 'static,
    Q: WorkQueue + 'static,
    P: ParameterSource + 'static,
    C: Clock + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .route(
            "/tasks",
            get(handlers::list_tasks::<S, Q, P, C>).post(handlers::create_task::<S, Q, P, C>),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task::<S, Q, P, C>).delete(handlers::delete_task::<S, Q, P, C>),
        )
        .method_not_allowed_fallback(handlers::fallback)
        .fallback(handlers::fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[cfg(test)]
mod tests;
