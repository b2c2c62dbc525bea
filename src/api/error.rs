//! HTTP error type for the task API.
//!
//! Handlers return `Result<T, ApiError>`. Client errors carry only a
//! `message`; internal faults are logged and also echo the underlying error
//! text in an `error` field.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::task::domain::TaskDomainError;
use crate::task::services::TaskServiceError;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request syntax, such as an unparseable body or cursor.
    #[error("{0}")]
    BadRequest(String),

    /// Well-formed request with invalid content.
    #[error("{0}")]
    Unprocessable(String),

    /// The route or resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An unexpected failure in a collaborator.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Domain(TaskDomainError::EmptyTopic) => {
                Self::Unprocessable("topic is required".to_owned())
            }
            TaskServiceError::Domain(TaskDomainError::InvalidTaskId(_))
            | TaskServiceError::NotFound(_) => Self::NotFound("task not found".to_owned()),
            TaskServiceError::InvalidCursor => Self::BadRequest(err.to_string()),
            TaskServiceError::Domain(_)
            | TaskServiceError::Configuration(_)
            | TaskServiceError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "message": message })),
            Self::Unprocessable(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "message": message }),
            ),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            Self::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "internal server error", "error": detail }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
