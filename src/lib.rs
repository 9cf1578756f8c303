//! Kanban intake: turns structured proposals and free-form sentences into
//! cards on a remote kanban board without creating duplicates.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: date interpretation, text extraction, fuzzy catalog
//!   resolution, and idempotency keys, with no infrastructure dependencies
//! - **Ports**: async traits for the board and the local task record store
//! - **Adapters**: in-memory and JSON-file implementations of the ports
//! - **Services**: the creation and interpretation flows
//!
//! # Modules
//!
//! - [`intake`]: proposal model, resolution engine, and orchestration
//! - [`config`]: configuration file loading and per-project board selection
//! - [`telemetry`]: log subscriber construction from explicit settings

pub mod config;
pub mod intake;
pub mod telemetry;
