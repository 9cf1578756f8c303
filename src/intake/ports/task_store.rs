//! Local record store port for tasks created on the board.

use crate::intake::domain::{EntityId, LocalTask, LocalTaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for local task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Local task record contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalTaskStore: Send + Sync {
    /// Finds the local task linked to a remote card.
    ///
    /// Returns `None` when no local task points at the card.
    async fn find_by_remote_id(&self, card_id: &EntityId) -> TaskStoreResult<Option<LocalTask>>;

    /// Records a new local task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the record cannot be
    /// written.
    async fn record(&self, task: &LocalTask) -> TaskStoreResult<()>;

    /// Links a recorded task to its remote card and flags it as synced.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn mark_synced(
        &self,
        id: &LocalTaskId,
        card_id: &EntityId,
        synced_at: DateTime<Utc>,
    ) -> TaskStoreResult<LocalTask>;
}

/// Errors returned by local task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The task was not found.
    #[error("local task not found: {0}")]
    NotFound(LocalTaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
