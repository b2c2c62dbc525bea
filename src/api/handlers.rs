//! Request handlers for the `/tasks` resource.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use mockable::Clock;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::ApiError;
use crate::config::ParameterSource;
use crate::identity::extract_identity;
use crate::task::domain::TaskId;
use crate::task::ports::{TaskStore, WorkQueue};
use crate::task::services::{ListTasksRequest, TaskService};

/// Raw query parameters for `GET /tasks`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ListQuery {
    limit: Option<String>,
    cursor: Option<String>,
}

impl ListQuery {
    fn into_request(self) -> Result<ListTasksRequest, ApiError> {
        let mut request = ListTasksRequest::new();
        if let Some(raw) = self.limit.filter(|value| !value.trim().is_empty()) {
            let limit = raw.trim().parse::<usize>().map_err(|_| {
                ApiError::BadRequest("limit must be a non-negative integer".to_owned())
            })?;
            request = request.with_limit(limit);
        }
        if let Some(cursor) = self.cursor.filter(|value| !value.is_empty()) {
            request = request.with_cursor(cursor);
        }
        Ok(request)
    }
}

/// Best-effort caller label for logs; never rejects a request.
async fn caller<S, Q, P, C>(service: &TaskService<S, Q, P, C>, headers: &HeaderMap) -> String
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    let Ok(config) = service.config().get().await else {
        return "anonymous".to_owned();
    };
    extract_identity(headers, &config, &**service.clock())
        .and_then(|identity| identity.label().map(str::to_owned))
        .unwrap_or_else(|| "anonymous".to_owned())
}

pub(super) async fn create_task<S, Q, P, C>(
    State(service): State<TaskService<S, Q, P, C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError>
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    let payload: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::BadRequest(format!("invalid JSON body: {err}")))?
    };
    let topic = payload
        .get("topic")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Unprocessable("topic is required".to_owned()))?;

    let caller_label = caller(&service, &headers).await;
    let created = service.create(topic).await?;
    info!(task_id = %created.id, caller = %caller_label, "create request accepted");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub(super) async fn list_tasks<S, Q, P, C>(
    State(service): State<TaskService<S, Q, P, C>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, ApiError>
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    let Query(params) = query.map_err(|rejection| {
        ApiError::BadRequest(format!("invalid query: {}", rejection.body_text()))
    })?;
    let page = service.list(params.into_request()?).await?;
    debug!(items = page.items.len(), more = page.cursor.is_some(), "listed tasks");
    Ok(Json(page).into_response())
}

pub(super) async fn get_task<S, Q, P, C>(
    State(service): State<TaskService<S, Q, P, C>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError>
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    let id: TaskId = raw_id
        .parse()
        .map_err(|_| ApiError::NotFound("task not found".to_owned()))?;
    let task = service.get(id).await?;
    Ok(Json(task).into_response())
}

pub(super) async fn delete_task<S, Q, P, C>(
    State(service): State<TaskService<S, Q, P, C>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: TaskStore,
    Q: WorkQueue,
    P: ParameterSource,
    C: Clock + Send + Sync,
{
    let Ok(id) = raw_id.parse::<TaskId>() else {
        debug!(raw_id = %raw_id, "delete of malformed id is a no-op");
        return Ok(StatusCode::NO_CONTENT);
    };
    let caller_label = caller(&service, &headers).await;
    service.delete(id).await?;
    info!(task_id = %id, caller = %caller_label, "delete request handled");
    Ok(StatusCode::NO_CONTENT)
}

/// Answers `OPTIONS` on any path and 404s everything else.
pub(super) async fn fallback(method: Method) -> Result<StatusCode, ApiError> {
    if method == Method::OPTIONS {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("route not found".to_owned()))
    }
}
