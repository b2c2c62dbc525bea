//! Newest-first listing and deletion through the service.

use std::collections::HashSet;

use notewright::task::ports::TaskStore;
use notewright::task::services::{ListTasksRequest, TaskServiceError};
use rstest::{fixture, rstest};

use super::helpers::Pipeline;

#[fixture]
fn pipeline() -> Pipeline {
    Pipeline::new()
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(25)]
#[tokio::test(flavor = "multi_thread")]
async fn pages_visit_every_task_once(pipeline: Pipeline, #[case] limit: usize) {
    let mut created = HashSet::new();
    for index in 0..9 {
        let task = pipeline
            .service
            .create(format!("Topic {index}"))
            .await
            .expect("creation should succeed");
        created.insert(task.id);
    }

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let request = cursor.take().map_or_else(
            || ListTasksRequest::new().with_limit(limit),
            |token| ListTasksRequest::new().with_limit(limit).with_cursor(token),
        );
        let page = pipeline.service.list(request).await.expect("list should succeed");
        assert!(page.items.len() <= limit);
        seen.extend(page.items);
        match page.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    let ids: HashSet<_> = seen.iter().map(|summary| summary.id).collect();
    assert_eq!(seen.len(), created.len());
    assert_eq!(ids, created);
    assert!(
        seen.windows(2)
            .all(|pair| matches!(pair, [newer, older] if newer.created_at >= older.created_at))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_tasks_disappear_from_listing(pipeline: Pipeline) {
    let kept = pipeline.service.create("Kept").await.expect("created");
    let removed = pipeline.service.create("Removed").await.expect("created");

    pipeline.service.delete(removed.id).await.expect("delete");
    pipeline.service.delete(removed.id).await.expect("repeat delete");

    let page = pipeline
        .service
        .list(ListTasksRequest::new())
        .await
        .expect("list should succeed");
    let ids: Vec<_> = page.items.iter().map(|summary| summary.id).collect();
    assert_eq!(ids, vec![kept.id]);
    assert!(matches!(
        pipeline.service.get(removed.id).await,
        Err(TaskServiceError::NotFound(_))
    ));
    assert!(
        pipeline
            .store
            .find_by_id(removed.id)
            .await
            .expect("lookup")
            .is_none()
    );
}
