//! Domain model for task-card intake.
//!
//! Everything in this module is free of board and storage concerns: dates are
//! interpreted against a caller-supplied instant, catalogs are plain slices,
//! and entity creation is delegated to a callback.

mod catalog;
mod date;
mod error;
mod extract;
mod idempotency;
mod ids;
mod local_task;
mod proposal;
mod resolve;

pub use catalog::{BoardCard, CardPayload, CatalogEntity, EntityKind};
pub use date::{
    Locale, end_of_day, end_of_next_week, parse_date, parse_timestamp,
};
pub use error::{ProposalError, ResolutionError};
pub use extract::{
    END_OF_NEXT_WEEK, Extraction, extract, extract_date_phrase, guess_labels, normalize_title,
};
pub use idempotency::{
    ExistingCard, IdempotencyKey, MatchedBy, find_existing_card, normalize_for_match,
};
pub use ids::{BoardId, EntityId, LocalTaskId};
pub use local_task::{LocalSubtask, LocalTask, LocalTaskStatus};
pub use proposal::TaskProposal;
pub use resolve::{Resolution, fuzzy_find, looks_like_id, resolve_or_create};
