//! Adapter implementations for intake ports.

pub mod json;
pub mod memory;
