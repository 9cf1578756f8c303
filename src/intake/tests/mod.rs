//! Unit tests for the intake module.
//!
//! Tests are organised by component, covering the ordered rule lists, the
//! error paths, and the creation flow against in-memory and mocked ports.

mod support;
