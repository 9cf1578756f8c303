//! Board port: catalog reads and additive mutations against a remote board.

use crate::intake::domain::{BoardCard, CardPayload, CatalogEntity, EntityId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board gateway operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Remote board contract.
///
/// Implementations are bound to one board. Catalog reads return a fresh
/// snapshot on every call; mutations only ever add entities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Returns the board's lists.
    async fn fetch_lists(&self) -> BoardResult<Vec<CatalogEntity>>;

    /// Returns the board's labels.
    async fn fetch_labels(&self) -> BoardResult<Vec<CatalogEntity>>;

    /// Returns every card on the board across all lists.
    async fn fetch_all_cards(&self) -> BoardResult<Vec<BoardCard>>;

    /// Creates a list at the end of the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board rejects the request or the
    /// transport fails.
    async fn create_list(&self, name: &str) -> BoardResult<CatalogEntity>;

    /// Creates a label with the given color.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board rejects the request or the
    /// transport fails.
    async fn create_label(&self, name: &str, color: &str) -> BoardResult<CatalogEntity>;

    /// Creates a card in the given list.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board rejects the request or the
    /// transport fails.
    async fn create_card(&self, list_id: &EntityId, payload: &CardPayload)
    -> BoardResult<BoardCard>;

    /// Creates a named task list (checklist) on a card.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board rejects the request or the
    /// transport fails.
    async fn create_task_list(&self, card_id: &EntityId, name: &str) -> BoardResult<EntityId>;

    /// Appends an item to a task list.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board rejects the request or the
    /// transport fails.
    async fn create_task_item(
        &self,
        task_list_id: &EntityId,
        title: &str,
        completed: bool,
    ) -> BoardResult<EntityId>;
}

/// Errors returned by board gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardError {
    /// The board refused the operation.
    #[error("board rejected {operation}: {reason}")]
    Rejected {
        /// Operation that was attempted.
        operation: &'static str,
        /// Reason given by the board.
        reason: String,
    },

    /// Transport-layer failure.
    #[error("board transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardError {
    /// Builds a rejection for `operation`.
    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }

    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
