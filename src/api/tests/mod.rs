//! HTTP tests for the task routes.


use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::{ConfigCache, adapters::InMemoryParameterSource};
use crate::task::adapters::memory::{InMemoryTaskStore, InMemoryWorkQueue};
use crate::task::services::TaskService;
use crate::test_support::SteppingClock;

const PREFIX: &str = "/notewright/test/";
const QUEUE_URL: &str = "memory://work";

/// Router plus handles on the adapters behind it.
struct ApiHarness {
    source: InMemoryParameterSource,
    store: InMemoryTaskStore,
    queue: InMemoryWorkQueue,
    app: Router,
}

impl ApiHarness {
    fn new() -> Self {
        let source = InMemoryParameterSource::new();
        source
            .set(format!("{PREFIX}queue_url"), QUEUE_URL)
            .expect("seeding queue url should succeed");
        let store = InMemoryTaskStore::new();
        let queue = InMemoryWorkQueue::new(QUEUE_URL);
        let clock = Arc::new(SteppingClock::new());
        let config = ConfigCache::new(Arc::new(source.clone()), Arc::clone(&clock), PREFIX);
        let service = TaskService::new(
            Arc::new(store.clone()),
            Arc::new(queue.clone()),
            Arc::new(config),
            clock,
        );
        Self {
            source,
            store,
            queue,
            app: super::router(service),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes()
            .to_vec();
        (status, headers, body)
    }

    async fn call(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |text| Body::from(text.to_owned())))
            .expect("request should build");
        let (status, _, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response should be JSON")
        };
        (status, value)
    }
}
