//! Create-to-done flows through the service, queue and worker.

use notewright::task::domain::TaskStatus;
use rstest::{fixture, rstest};
use serde_json::Value;

use super::helpers::{NOTIFY_CHANNEL, PREFIX, Pipeline};

#[fixture]
fn pipeline() -> Pipeline {
    Pipeline::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn photosynthesis_reaches_done_and_notifies(pipeline: Pipeline) {
    let created = pipeline
        .service
        .create("Photosynthesis")
        .await
        .expect("creation should succeed");
    assert_eq!(created.status, TaskStatus::Queued);

    pipeline.drain().await;

    let task = pipeline.service.get(created.id).await.expect("task exists");
    assert_eq!(task.status(), TaskStatus::Done);
    assert!(task.research_md().starts_with("# Photosynthesis"));
    assert!(task.error().is_none());
    assert!(task.updated_at() >= task.created_at());

    let events = pipeline.notifier.events().expect("events");
    assert_eq!(events.len(), 1);
    let event = events.first().expect("one event");
    assert_eq!(event.channel, NOTIFY_CHANNEL);
    let message: Value = serde_json::from_str(&event.message).expect("JSON message");
    assert_eq!(message["id"], created.id.to_string());
    assert_eq!(message["status"], "DONE");
    assert!(pipeline.queue.visible_bodies().expect("bodies").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_generation_is_retried_then_dead_lettered(pipeline: Pipeline) {
    pipeline.generator.fail_topic("Dark matter", "backend overloaded");
    let created = pipeline
        .service
        .create("Dark matter")
        .await
        .expect("creation should succeed");

    pipeline.drain().await;

    let task = pipeline.service.get(created.id).await.expect("task exists");
    assert_eq!(task.status(), TaskStatus::Error);
    assert!(
        task.error()
            .is_some_and(|detail| detail.contains("backend overloaded"))
    );
    assert!(task.research_md().is_empty());
    assert_eq!(pipeline.generator.calls().len(), 2);
    assert_eq!(pipeline.queue.dead_letters().expect("dead letters").len(), 1);
    assert!(pipeline.notifier.events().expect("events").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn redelivery_recovers_errored_task(pipeline: Pipeline) {
    pipeline.generator.fail_topic("Tides", "transient");
    let created = pipeline
        .service
        .create("Tides")
        .await
        .expect("creation should succeed");

    pipeline
        .poller
        .poll_once()
        .await
        .expect("first poll should succeed");
    let errored = pipeline.service.get(created.id).await.expect("task exists");
    assert_eq!(errored.status(), TaskStatus::Error);

    pipeline.generator.heal_topic("Tides");
    pipeline.drain().await;

    let task = pipeline.service.get(created.id).await.expect("task exists");
    assert_eq!(task.status(), TaskStatus::Done);
    assert!(task.error().is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_failures_do_not_block_siblings(pipeline: Pipeline) {
    pipeline.generator.fail_topic("Broken", "nope");
    let good = pipeline.service.create("Working").await.expect("created");
    let bad = pipeline.service.create("Broken").await.expect("created");

    pipeline
        .poller
        .poll_once()
        .await
        .expect("poll should succeed");

    let good_task = pipeline.service.get(good.id).await.expect("task exists");
    let bad_task = pipeline.service.get(bad.id).await.expect("task exists");
    assert_eq!(good_task.status(), TaskStatus::Done);
    assert_eq!(bad_task.status(), TaskStatus::Error);
    assert_eq!(pipeline.queue.visible_bodies().expect("bodies").len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_api_key_leaves_tasks_queued(pipeline: Pipeline) {
    pipeline
        .source
        .remove(&format!("{PREFIX}generation/api_key"))
        .expect("removal should succeed");
    let created = pipeline.service.create("Volcanoes").await.expect("created");

    pipeline
        .poller
        .poll_once()
        .await
        .expect("poll should succeed");

    let task = pipeline.service.get(created.id).await.expect("task exists");
    assert_eq!(task.status(), TaskStatus::Queued);
    assert!(pipeline.generator.calls().is_empty());
    assert_eq!(pipeline.queue.visible_bodies().expect("bodies").len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unconfigured_queue_keeps_task_queued(pipeline: Pipeline) {
    pipeline
        .source
        .set(format!("{PREFIX}queue_url"), "memory://nowhere")
        .expect("override should succeed");

    let created = pipeline
        .service
        .create("Glaciers")
        .await
        .expect("creation should succeed despite publish failure");

    let task = pipeline.service.get(created.id).await.expect("task exists");
    assert_eq!(task.status(), TaskStatus::Queued);
    assert!(pipeline.queue.visible_bodies().expect("bodies").is_empty());
}
