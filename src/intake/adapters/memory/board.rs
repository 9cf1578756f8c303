//! In-memory board that records every mutation in call order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::intake::{
    domain::{BoardCard, CardPayload, CatalogEntity, EntityId},
    ports::{BoardError, BoardGateway, BoardResult},
};

const POSITION_STEP: u32 = 65_536;

/// Mutating board operations, used to script rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardOperation {
    /// List creation.
    CreateList,
    /// Label creation.
    CreateLabel,
    /// Card creation.
    CreateCard,
    /// Task list creation.
    CreateTaskList,
    /// Task item creation.
    CreateTaskItem,
}

impl BoardOperation {
    /// Returns the operation name used in rejection errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateList => "create list",
            Self::CreateLabel => "create label",
            Self::CreateCard => "create card",
            Self::CreateTaskList => "create task list",
            Self::CreateTaskItem => "create task item",
        }
    }
}

impl fmt::Display for BoardOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation issued against the board, as recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardCall {
    /// A list was created.
    CreateList {
        /// Requested list name.
        name: String,
    },
    /// A label was created.
    CreateLabel {
        /// Requested label name.
        name: String,
        /// Requested label color.
        color: String,
    },
    /// A card was created.
    CreateCard {
        /// Target list.
        list_id: EntityId,
        /// Payload as sent.
        payload: CardPayload,
    },
    /// A task list was created on a card.
    CreateTaskList {
        /// Owning card.
        card_id: EntityId,
        /// Task list name.
        name: String,
    },
    /// A task item was appended to a task list.
    CreateTaskItem {
        /// Owning task list.
        task_list_id: EntityId,
        /// Item title.
        title: String,
        /// Completion flag.
        completed: bool,
    },
}

impl BoardCall {
    /// Returns the operation this call performed.
    #[must_use]
    pub const fn operation(&self) -> BoardOperation {
        match self {
            Self::CreateList { .. } => BoardOperation::CreateList,
            Self::CreateLabel { .. } => BoardOperation::CreateLabel,
            Self::CreateCard { .. } => BoardOperation::CreateCard,
            Self::CreateTaskList { .. } => BoardOperation::CreateTaskList,
            Self::CreateTaskItem { .. } => BoardOperation::CreateTaskItem,
        }
    }
}

/// Catalog contents of a board at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    /// Lists in board order.
    pub lists: Vec<CatalogEntity>,
    /// Labels in board order.
    pub labels: Vec<CatalogEntity>,
    /// Cards across all lists.
    pub cards: Vec<BoardCard>,
}

impl BoardSnapshot {
    /// Adds a list.
    #[must_use]
    pub fn with_list(mut self, list: CatalogEntity) -> Self {
        self.lists.push(list);
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, label: CatalogEntity) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a card.
    #[must_use]
    pub fn with_card(mut self, card: BoardCard) -> Self {
        self.cards.push(card);
        self
    }
}

/// Thread-safe in-memory board.
///
/// Identifiers issued by the board are 24-digit hexadecimal counters. Card
/// scans and individual mutations can be scripted to fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoard {
    state: Arc<RwLock<BoardState>>,
}

#[derive(Debug, Default)]
struct BoardState {
    snapshot: BoardSnapshot,
    calls: Vec<BoardCall>,
    next_id: u64,
    card_scan_failure: Option<String>,
    rejections: HashMap<BoardOperation, String>,
}

impl BoardState {
    fn issue_id(&mut self) -> EntityId {
        self.next_id = self.next_id.saturating_add(1);
        EntityId::new(format!("{:024x}", self.next_id))
    }

    fn ensure_allowed(&self, operation: BoardOperation) -> BoardResult<()> {
        self.rejections
            .get(&operation)
            .map_or(Ok(()), |reason| {
                Err(BoardError::rejected(operation.as_str(), reason.clone()))
            })
    }

    /// Places new entities after every existing one; ties keep insertion
    /// order because position sorting is stable.
    fn next_position(entities: &[CatalogEntity]) -> f64 {
        let rank = u32::try_from(entities.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        entities
            .iter()
            .map(|entity| entity.position)
            .fold(f64::from(rank.saturating_mul(POSITION_STEP)), f64::max)
    }
}

impl InMemoryBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board holding `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(BoardState {
                snapshot,
                ..BoardState::default()
            })),
        }
    }

    /// Makes every subsequent card scan fail with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Transport`] when the state lock is poisoned.
    pub fn fail_card_scan(&self, reason: impl Into<String>) -> BoardResult<()> {
        self.write()?.card_scan_failure = Some(reason.into());
        Ok(())
    }

    /// Makes every subsequent `operation` fail with a rejection.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Transport`] when the state lock is poisoned.
    pub fn reject(&self, operation: BoardOperation, reason: impl Into<String>) -> BoardResult<()> {
        self.write()?.rejections.insert(operation, reason.into());
        Ok(())
    }

    /// Returns recorded mutations in call order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Transport`] when the state lock is poisoned.
    pub fn calls(&self) -> BoardResult<Vec<BoardCall>> {
        Ok(self.read()?.calls.clone())
    }

    /// Returns the current catalog contents.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Transport`] when the state lock is poisoned.
    pub fn snapshot(&self) -> BoardResult<BoardSnapshot> {
        Ok(self.read()?.snapshot.clone())
    }

    fn read(&self) -> BoardResult<RwLockReadGuard<'_, BoardState>> {
        self.state
            .read()
            .map_err(|err| BoardError::transport(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> BoardResult<RwLockWriteGuard<'_, BoardState>> {
        self.state
            .write()
            .map_err(|err| BoardError::transport(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl BoardGateway for InMemoryBoard {
    async fn fetch_lists(&self) -> BoardResult<Vec<CatalogEntity>> {
        Ok(self.read()?.snapshot.lists.clone())
    }

    async fn fetch_labels(&self) -> BoardResult<Vec<CatalogEntity>> {
        Ok(self.read()?.snapshot.labels.clone())
    }

    async fn fetch_all_cards(&self) -> BoardResult<Vec<BoardCard>> {
        let state = self.read()?;
        if let Some(reason) = &state.card_scan_failure {
            return Err(BoardError::transport(std::io::Error::other(reason.clone())));
        }
        Ok(state.snapshot.cards.clone())
    }

    async fn create_list(&self, name: &str) -> BoardResult<CatalogEntity> {
        let mut state = self.write()?;
        state.ensure_allowed(BoardOperation::CreateList)?;
        let id = state.issue_id();
        let position = BoardState::next_position(&state.snapshot.lists);
        let list = CatalogEntity {
            id,
            name: name.to_owned(),
            position,
            color: None,
        };
        state.snapshot.lists.push(list.clone());
        state.calls.push(BoardCall::CreateList {
            name: name.to_owned(),
        });
        Ok(list)
    }

    async fn create_label(&self, name: &str, color: &str) -> BoardResult<CatalogEntity> {
        let mut state = self.write()?;
        state.ensure_allowed(BoardOperation::CreateLabel)?;
        let id = state.issue_id();
        let position = BoardState::next_position(&state.snapshot.labels);
        let label = CatalogEntity {
            id,
            name: name.to_owned(),
            position,
            color: Some(color.to_owned()),
        };
        state.snapshot.labels.push(label.clone());
        state.calls.push(BoardCall::CreateLabel {
            name: name.to_owned(),
            color: color.to_owned(),
        });
        Ok(label)
    }

    async fn create_card(
        &self,
        list_id: &EntityId,
        payload: &CardPayload,
    ) -> BoardResult<BoardCard> {
        let mut state = self.write()?;
        state.ensure_allowed(BoardOperation::CreateCard)?;
        let list_name = state
            .snapshot
            .lists
            .iter()
            .find(|list| &list.id == list_id)
            .map(|list| list.name.clone())
            .ok_or_else(|| {
                BoardError::rejected(
                    BoardOperation::CreateCard.as_str(),
                    format!("unknown list {list_id}"),
                )
            })?;
        let card = BoardCard {
            id: state.issue_id(),
            name: payload.name.clone(),
            description: Some(payload.description.clone()),
            list_id: Some(list_id.clone()),
            list_name: Some(list_name),
        };
        state.snapshot.cards.push(card.clone());
        state.calls.push(BoardCall::CreateCard {
            list_id: list_id.clone(),
            payload: payload.clone(),
        });
        Ok(card)
    }

    async fn create_task_list(&self, card_id: &EntityId, name: &str) -> BoardResult<EntityId> {
        let mut state = self.write()?;
        state.ensure_allowed(BoardOperation::CreateTaskList)?;
        let id = state.issue_id();
        state.calls.push(BoardCall::CreateTaskList {
            card_id: card_id.clone(),
            name: name.to_owned(),
        });
        Ok(id)
    }

    async fn create_task_item(
        &self,
        task_list_id: &EntityId,
        title: &str,
        completed: bool,
    ) -> BoardResult<EntityId> {
        let mut state = self.write()?;
        state.ensure_allowed(BoardOperation::CreateTaskItem)?;
        let id = state.issue_id();
        state.calls.push(BoardCall::CreateTaskItem {
            task_list_id: task_list_id.clone(),
            title: title.to_owned(),
            completed,
        });
        Ok(id)
    }
}
