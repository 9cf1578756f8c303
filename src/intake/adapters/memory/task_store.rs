//! In-memory local task store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::intake::{
    domain::{EntityId, LocalTask, LocalTaskId},
    ports::{LocalTaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store keeping records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<Vec<LocalTask>>>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn tasks(&self) -> TaskStoreResult<Vec<LocalTask>> {
        let tasks = self.tasks.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(tasks.clone())
    }
}

#[async_trait]
impl LocalTaskStore for InMemoryTaskStore {
    async fn find_by_remote_id(&self, card_id: &EntityId) -> TaskStoreResult<Option<LocalTask>> {
        let tasks = self.tasks.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(tasks
            .iter()
            .find(|task| task.remote_card_id() == Some(card_id))
            .cloned())
    }

    async fn record(&self, task: &LocalTask) -> TaskStoreResult<()> {
        let mut tasks = self.tasks.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        tasks.retain(|existing| existing.id() != task.id());
        tasks.push(task.clone());
        Ok(())
    }

    async fn mark_synced(
        &self,
        id: &LocalTaskId,
        card_id: &EntityId,
        synced_at: DateTime<Utc>,
    ) -> TaskStoreResult<LocalTask> {
        let mut tasks = self.tasks.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .ok_or_else(|| TaskStoreError::NotFound(id.clone()))?;
        task.mark_synced(card_id.clone(), synced_at);
        Ok(task.clone())
    }
}
