//! In-memory task store for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskId, TaskStatus},
    ports::{StoreKey, StorePage, TaskStore, TaskStoreError, TaskStoreResult},
};

type OrderKey = (DateTime<Utc>, TaskId);

/// Thread-safe in-memory task store with a newest-first ordering view.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    tasks: HashMap<TaskId, Task>,
    creation_index: BTreeSet<OrderKey>,
    failing_updates: HashSet<TaskStatus>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes updates that would leave a task in `status` fail.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn fail_updates_to(&self, status: TaskStatus) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.failing_updates.insert(status);
        Ok(())
    }

    /// Returns how many tasks are stored.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn task_count(&self) -> TaskStoreResult<usize> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.tasks.len())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }

        state.creation_index.insert((task.created_at(), task.id()));
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.failing_updates.contains(&task.status()) {
            return Err(TaskStoreError::persistence(std::io::Error::other(format!(
                "simulated write failure for status {}",
                task.status()
            ))));
        }

        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskStoreError::NotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if let Some(removed) = state.tasks.remove(&id) {
            state
                .creation_index
                .remove(&(removed.created_at(), removed.id()));
        }
        Ok(())
    }

    async fn list_newest_first(
        &self,
        limit: usize,
        after: Option<StoreKey>,
    ) -> TaskStoreResult<StorePage> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;

        let upper = after.map_or(Bound::Unbounded, |key| {
            Bound::Excluded((key.created_at, key.id))
        });
        let mut keys = state
            .creation_index
            .range((Bound::Unbounded, upper))
            .rev()
            .filter_map(|(_, id)| state.tasks.get(id));

        let items: Vec<_> = keys.by_ref().take(limit).map(Task::summary).collect();
        let has_more = keys.next().is_some();
        let next_key = items
            .last()
            .filter(|_| has_more)
            .map(StoreKey::of);

        Ok(StorePage { items, next_key })
    }
}
