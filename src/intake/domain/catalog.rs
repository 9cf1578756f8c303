//! Board catalog entities and the card creation payload.

use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog entity being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A board list (column).
    List,
    /// A board label.
    Label,
}

impl EntityKind {
    /// Returns the human-readable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Label => "label",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A list or label as reported by the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntity {
    /// Remote identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Ordering hint; lower positions sort first.
    #[serde(default)]
    pub position: f64,
    /// Label color, when the entity is a label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CatalogEntity {
    /// Creates an entity without color.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: f64) -> Self {
        Self {
            id: EntityId::new(id),
            name: name.into(),
            position,
            color: None,
        }
    }

    /// Sets the label color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sorts entities by position, keeping the board's order for ties.
    pub fn sort_by_position(entities: &mut [Self]) {
        entities.sort_by(|left, right| left.position.total_cmp(&right.position));
    }
}

/// A card as reported by the board's card listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCard {
    /// Remote card identifier.
    pub id: EntityId,
    /// Card title.
    pub name: String,
    /// Card description, when set.
    #[serde(default)]
    pub description: Option<String>,
    /// Identifier of the list holding the card.
    #[serde(default)]
    pub list_id: Option<EntityId>,
    /// Name of the list holding the card.
    #[serde(default)]
    pub list_name: Option<String>,
}

/// Fully resolved data sent to the board when creating a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    /// Card title.
    pub name: String,
    /// Card description including any idempotency marker.
    pub description: String,
    /// Resolved label identifiers in request order.
    pub label_ids: Vec<EntityId>,
    /// Due instant, when one could be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}
