//! JSON-file adapters.

mod task_store;

pub use task_store::JsonFileTaskStore;
