//! The create-process-read flow through the HTTP router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::Value;
use tower::ServiceExt;

use super::helpers::Pipeline;

#[fixture]
fn pipeline() -> Pipeline {
    Pipeline::new()
}

async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |value| Body::from(value.to_string())))
        .expect("request should build");
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should not fail");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response should be JSON")
    };
    (status, value)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitted_topic_is_readable_once_processed(pipeline: Pipeline) {
    let app = notewright::api::router(pipeline.service.clone());

    let (status, created) = call(
        &app,
        "POST",
        "/tasks",
        Some(serde_json::json!({ "topic": "Photosynthesis" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/tasks/{}", created["id"].as_str().expect("id"));

    let (_, before) = call(&app, "GET", &uri, None).await;
    assert_eq!(before["status"], "QUEUED");

    pipeline.drain().await;

    let (read_status, after) = call(&app, "GET", &uri, None).await;
    assert_eq!(read_status, StatusCode::OK);
    assert_eq!(after["status"], "DONE");
    assert!(
        after["researchMd"]
            .as_str()
            .is_some_and(|notes| notes.starts_with("# Photosynthesis"))
    );

    let (list_status, listing) = call(&app, "GET", "/tasks", None).await;
    assert_eq!(list_status, StatusCode::OK);
    assert_eq!(listing["items"][0]["status"], "DONE");
    assert!(listing["cursor"].is_null());
}
