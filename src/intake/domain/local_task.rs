//! Locally recorded task aggregate.

use super::{EntityId, LocalTaskId, TaskProposal};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Local work status of a recorded task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTaskStatus {
    /// Recorded, not yet worked on.
    Pending,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
    /// Any other status string found in a task file, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

/// A subtask tracked alongside its parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSubtask {
    /// Subtask identifier; any string read from a task file is kept.
    pub id: String,
    /// Subtask title.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A task recorded in the local store, optionally linked to a remote card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTask {
    id: LocalTaskId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    subtasks: Vec<LocalSubtask>,
    status: LocalTaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, rename = "plankaCardId")]
    remote_card_id: Option<EntityId>,
    #[serde(default)]
    synced: bool,
    /// Fields this crate does not model, such as `category`, `priority`, or
    /// `plankaTaskListId`, carried through unchanged.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl LocalTask {
    /// Records a new pending task from a proposal.
    #[must_use]
    pub fn from_proposal(proposal: &TaskProposal, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let subtasks = proposal
            .subtasks()
            .iter()
            .map(|title| LocalSubtask {
                id: Uuid::new_v4().to_string(),
                title: title.clone(),
                completed: false,
                created_at: timestamp,
            })
            .collect();

        Self {
            id: LocalTaskId::new(),
            title: proposal.title().to_owned(),
            description: proposal.description().unwrap_or_default().to_owned(),
            labels: proposal.labels().to_vec(),
            subtasks,
            status: LocalTaskStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
            remote_card_id: None,
            synced: false,
            extra: Map::new(),
        }
    }

    /// Links the task to its remote card and flags it as synced.
    pub fn mark_synced(&mut self, card_id: EntityId, synced_at: DateTime<Utc>) {
        self.remote_card_id = Some(card_id);
        self.synced = true;
        self.updated_at = synced_at;
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &LocalTaskId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the labels as requested.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the subtasks.
    #[must_use]
    pub fn subtasks(&self) -> &[LocalSubtask] {
        &self.subtasks
    }

    /// Returns the local status.
    #[must_use]
    pub const fn status(&self) -> &LocalTaskStatus {
        &self.status
    }

    /// Returns the linked remote card, if any.
    #[must_use]
    pub const fn remote_card_id(&self) -> Option<&EntityId> {
        self.remote_card_id.as_ref()
    }

    /// Returns whether the task has been synced to the board.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.synced
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns fields read from storage that have no typed counterpart.
    #[must_use]
    pub const fn extra_fields(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
