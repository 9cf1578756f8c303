//! In-memory adapters for tests and offline runs.

mod board;
mod task_store;

pub use board::{BoardCall, BoardOperation, BoardSnapshot, InMemoryBoard};
pub use task_store::InMemoryTaskStore;
