//! Idempotency keys and duplicate-card detection.
//!
//! A key is a truncated SHA-256 digest of the card's identity. It is embedded
//! in the card description as a marker so later runs can find the card by
//! substring search. Distinct identities may collide; the short key trades
//! uniqueness for compactness.

use super::{BoardCard, BoardId, EntityId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of digest bytes kept; rendered as 24 hex characters.
const KEY_BYTES: usize = 12;
const FIELD_SEPARATOR: &[u8] = b"|";
const MARKER_PREFIX: &str = "[planka-cli:idempotency=";
const MARKER_SUFFIX: &str = "]";

/// Short deterministic digest identifying a card creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Derives the key for a title on a board and list.
    ///
    /// The fields are hashed in order, so swapping them changes the key. A
    /// missing list name hashes as the empty string.
    #[must_use]
    pub fn derive(title: &str, board_id: &BoardId, list_name: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(board_id.as_str().as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(list_name.unwrap_or_default().as_bytes());
        let digest = hasher.finalize();

        let mut hex = String::with_capacity(KEY_BYTES * 2);
        for byte in digest.iter().take(KEY_BYTES) {
            hex.push(hex_digit(byte >> 4));
            hex.push(hex_digit(byte & 0x0f));
        }
        Self(hex)
    }

    /// Wraps a key supplied by a caller.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the marker embedded in card descriptions.
    #[must_use]
    pub fn marker(&self) -> String {
        format!("{MARKER_PREFIX}{}{MARKER_SUFFIX}", self.0)
    }

    /// Appends the marker to a description after a blank line.
    #[must_use]
    pub fn append_marker(&self, description: &str) -> String {
        format!("{description}\n\n{}", self.marker())
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16).unwrap_or('0')
}

/// How an existing card was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    /// The description carries the idempotency marker.
    Key,
    /// The normalized title and the list match.
    TitleAndList,
}

/// A previously created card found on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingCard {
    /// Remote identifier of the card.
    pub card_id: EntityId,
    /// Which stage of the check found it.
    pub matched_by: MatchedBy,
}

/// Normalizes a title for duplicate comparison: lowercase, single spaces,
/// ASCII letters, digits, and spaces only.
#[must_use]
pub fn normalize_for_match(text: &str) -> String {
    let collapsed = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == ' ')
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Looks for a card created earlier for the same task.
///
/// A card whose description contains the key marker wins. Otherwise a card
/// whose normalized name equals the normalized `title` matches when it sits
/// in list `list_id` or in a list named `list_name` (case-insensitive).
#[must_use]
pub fn find_existing_card(
    cards: &[BoardCard],
    key: &IdempotencyKey,
    title: &str,
    list_id: Option<&EntityId>,
    list_name: Option<&str>,
) -> Option<ExistingCard> {
    let marker = key.marker();
    if let Some(card) = cards.iter().find(|card| {
        card.description
            .as_deref()
            .is_some_and(|description| description.contains(&marker))
    }) {
        return Some(ExistingCard {
            card_id: card.id.clone(),
            matched_by: MatchedBy::Key,
        });
    }

    let target = normalize_for_match(title);
    if target.is_empty() {
        return None;
    }
    let requested_list = list_name.map(str::to_lowercase);
    cards
        .iter()
        .find(|card| {
            if normalize_for_match(&card.name) != target {
                return false;
            }
            let same_list_id = list_id.is_some_and(|id| card.list_id.as_ref() == Some(id));
            let same_list_name = requested_list.as_deref().is_some_and(|requested| {
                card.list_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase() == requested)
            });
            same_list_id || same_list_name
        })
        .map(|card| ExistingCard {
            card_id: card.id.clone(),
            matched_by: MatchedBy::TitleAndList,
        })
}
