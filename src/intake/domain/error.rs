//! Error types for proposal validation and catalog resolution.

use super::EntityKind;
use thiserror::Error;

/// Errors returned while validating a task proposal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProposalError {
    /// The raw input is not a JSON object.
    #[error("proposal input must be an object")]
    NotAnObject,

    /// The title is missing or empty after trimming.
    #[error("field \"title\" is required and must be a non-empty string")]
    MissingTitle,

    /// A field holds a value of the wrong type.
    #[error("field \"{field}\" must be {expected}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the accepted type.
        expected: &'static str,
    },

    /// A list field contains an empty entry.
    #[error("each entry of \"{field}\" must be a non-empty string (index {index})")]
    EmptyEntry {
        /// Name of the offending list field.
        field: &'static str,
        /// Position of the empty entry.
        index: usize,
    },
}

/// Errors returned while resolving a name against a board catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError<E> {
    /// Nothing matched and creation was not allowed.
    #[error("{kind} not found: {requested}")]
    NotFound {
        /// Kind of entity that was looked up.
        kind: EntityKind,
        /// Value the caller asked for.
        requested: String,
    },

    /// The creation callback failed.
    #[error(transparent)]
    Create(E),
}
