//! Port contracts for task-card intake.
//!
//! Ports define infrastructure-agnostic interfaces used by intake services.

pub mod board;
pub mod task_store;

pub use board::{BoardError, BoardGateway, BoardResult};
pub use task_store::{LocalTaskStore, TaskStoreError, TaskStoreResult};
