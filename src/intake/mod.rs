//! Task-card intake for kanban boards.
//!
//! This module turns structured proposals or free-form sentences into cards on
//! a remote board without creating duplicates across repeated invocations:
//! free text is interpreted into a proposal, proposal fields are resolved
//! against the live board catalog with tiered fuzzy matching, and a
//! content-derived idempotency key guards creation. The module follows
//! hexagonal architecture:
//!
//! - Domain types and pure decision logic in [`domain`]
//! - Port contracts for the board and the local record store in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
