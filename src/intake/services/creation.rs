//! Creation orchestrator: validate, resolve, check for duplicates, create,
//! and record.
//!
//! One call runs the linear flow `Validated -> ListResolved -> LabelsResolved
//! -> (DryRunReturned | IdempotencyChecked) -> Created | ExistingFound`. Board
//! calls are issued one at a time because later steps need identifiers from
//! earlier ones. Nothing is rolled back: an error raised after the card was
//! created leaves the card on the board.

use super::IntakeSettings;
use crate::intake::{
    domain::{
        CardPayload, CatalogEntity, EntityId, EntityKind, IdempotencyKey, LocalTask,
        LocalTaskId, MatchedBy, ProposalError, Resolution, ResolutionError, TaskProposal,
        find_existing_card, fuzzy_find, looks_like_id, parse_date, parse_timestamp,
        resolve_or_create,
    },
    ports::{BoardError, BoardGateway, LocalTaskStore, TaskStoreError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const PLANNED_ID_PREFIX: &str = "planned:";

/// Switches for a single creation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    dry_run: bool,
    disallow_create: bool,
    idempotency_key: Option<IdempotencyKey>,
}

impl CreateOptions {
    /// Creates options for a real run that may create lists and labels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves everything but performs no mutation and no duplicate check.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Fails instead of creating missing lists or labels.
    #[must_use]
    pub const fn with_disallow_create(mut self, disallow_create: bool) -> Self {
        self.disallow_create = disallow_create;
        self
    }

    /// Embeds `key` in the card and checks the board for an earlier card.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    /// Returns whether this is a dry run.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether missing lists and labels are an error.
    #[must_use]
    pub const fn disallow_create(&self) -> bool {
        self.disallow_create
    }

    /// Returns the idempotency key, if any.
    #[must_use]
    pub const fn idempotency_key(&self) -> Option<&IdempotencyKey> {
        self.idempotency_key.as_ref()
    }
}

/// Everything a real run would have sent to the board.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedCreation {
    /// Target list; `was_created` means the list would be created.
    pub list: Resolution,
    /// Labels in request order; `was_created` means the label would be
    /// created.
    pub labels: Vec<Resolution>,
    /// Card payload as it would be sent.
    pub payload: CardPayload,
    /// Subtask titles that would become task items.
    pub subtasks: Vec<String>,
}

/// A card created by a real run.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedCard {
    /// Remote card identifier.
    pub card_id: EntityId,
    /// Local record linked to the card.
    pub task_id: LocalTaskId,
    /// Target list, flagged when it was created by this run.
    pub list: Resolution,
    /// Labels created by this run.
    pub labels_created: Vec<Resolution>,
    /// Task list holding the subtasks, when there were any.
    pub task_list_id: Option<EntityId>,
}

/// Result of a creation call.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationOutcome {
    /// Dry run: nothing was sent to the board.
    Simulated(SimulatedCreation),
    /// A card for this task already exists; nothing was created.
    Existed {
        /// Remote identifier of the existing card.
        card_id: EntityId,
        /// Local record pointing at the card, when one was found.
        local_task_id: Option<LocalTaskId>,
        /// How the card was recognised.
        matched_by: MatchedBy,
    },
    /// The card was created.
    Created(CreatedCard),
}

impl CreationOutcome {
    /// Returns the remote card this outcome refers to, if any.
    #[must_use]
    pub const fn card_id(&self) -> Option<&EntityId> {
        match self {
            Self::Simulated(_) => None,
            Self::Existed { card_id, .. } => Some(card_id),
            Self::Created(created) => Some(&created.card_id),
        }
    }

    /// Renders the outcome as the JSON document reported to callers.
    ///
    /// The three shapes are `{ "simulated": true, "payload": .. }`,
    /// `{ "existed": true, "cardId": .., "localTaskId": .. }`, and
    /// `{ "cardId": .., "taskId": .., "created": { "listCreated",
    /// "labelsCreated", "cardCreated" } }`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Simulated(simulated) => json!({
                "simulated": true,
                "payload": {
                    "listId": simulated.list.id,
                    "cardData": simulated.payload,
                    "subtasks": simulated.subtasks,
                },
                "planned": {
                    "listCreated": simulated.list.was_created,
                    "labelsCreated": created_labels_json(&simulated.labels),
                },
            }),
            Self::Existed {
                card_id,
                local_task_id,
                ..
            } => json!({
                "existed": true,
                "cardId": card_id,
                "localTaskId": local_task_id,
            }),
            Self::Created(created) => json!({
                "cardId": created.card_id,
                "taskId": created.task_id,
                "created": {
                    "listCreated": created.list.was_created,
                    "labelsCreated": created_labels_json(&created.labels_created),
                    "cardCreated": true,
                },
            }),
        }
    }
}

fn created_labels_json(labels: &[Resolution]) -> Vec<Value> {
    labels
        .iter()
        .filter(|label| label.was_created)
        .map(|label| json!({ "id": label.id, "name": label.name }))
        .collect()
}

/// Service-level errors for task creation.
#[derive(Debug, Error)]
pub enum TaskCreationError {
    /// The proposal is malformed.
    #[error(transparent)]
    Validation(#[from] ProposalError),

    /// A list or label is missing and creation was disallowed.
    #[error("{kind} not found: {requested}")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Value the caller asked for.
        requested: String,
    },

    /// No list was requested and the board has none to fall back to.
    #[error("the board has no list to place the card in")]
    NoListAvailable,

    /// A board call failed.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// The local record store failed.
    #[error(transparent)]
    TaskStore(#[from] TaskStoreError),
}

impl From<ResolutionError<BoardError>> for TaskCreationError {
    fn from(err: ResolutionError<BoardError>) -> Self {
        match err {
            ResolutionError::NotFound { kind, requested } => Self::NotFound { kind, requested },
            ResolutionError::Create(board) => Self::Board(board),
        }
    }
}

/// Result type for task creation operations.
pub type TaskCreationResult<T> = Result<T, TaskCreationError>;

/// Creates cards from proposals without duplicating earlier runs.
pub struct TaskCreationService<B, S, C>
where
    B: BoardGateway,
    S: LocalTaskStore,
    C: Clock + Send + Sync,
{
    board: Arc<B>,
    store: Arc<S>,
    clock: Arc<C>,
    settings: IntakeSettings,
}

impl<B, S, C> TaskCreationService<B, S, C>
where
    B: BoardGateway,
    S: LocalTaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new creation service.
    #[must_use]
    pub const fn new(board: Arc<B>, store: Arc<S>, clock: Arc<C>, settings: IntakeSettings) -> Self {
        Self {
            board,
            store,
            clock,
            settings,
        }
    }

    /// Returns the settings this service runs with.
    #[must_use]
    pub const fn settings(&self) -> &IntakeSettings {
        &self.settings
    }

    /// Runs the creation flow for `proposal`.
    ///
    /// A failed scan for existing cards, or a failed local lookup for a found
    /// card, is logged and treated as "no match".
    ///
    /// # Errors
    ///
    /// Returns [`TaskCreationError::Validation`] before any board call when
    /// the proposal is malformed, [`TaskCreationError::NotFound`] when a
    /// list or label is missing and creation is disallowed,
    /// [`TaskCreationError::NoListAvailable`] when the board has no lists,
    /// and [`TaskCreationError::Board`] or [`TaskCreationError::TaskStore`]
    /// when a collaborator fails.
    pub async fn create(
        &self,
        proposal: &TaskProposal,
        options: &CreateOptions,
    ) -> TaskCreationResult<CreationOutcome> {
        proposal.validate()?;

        let mut lists = self.board.fetch_lists().await?;
        CatalogEntity::sort_by_position(&mut lists);
        let list = self.resolve_list(proposal, &lists, options).await?;
        debug!(
            list_id = %list.id,
            list_name = %list.name,
            created = list.was_created,
            "resolved target list"
        );

        let labels = self.resolve_labels(proposal.labels(), options).await?;
        let payload = self.build_payload(proposal, &labels, options.idempotency_key());

        if options.dry_run() {
            info!(title = proposal.title(), "dry run, card not created");
            return Ok(CreationOutcome::Simulated(SimulatedCreation {
                list,
                labels,
                payload,
                subtasks: proposal.subtasks().to_vec(),
            }));
        }

        if let Some(existing) = self
            .find_existing(proposal, options.idempotency_key(), &list)
            .await
        {
            return Ok(existing);
        }

        self.create_card(proposal, list, labels, &payload).await
    }

    /// Picks the target list.
    ///
    /// A `listId` that matches no catalog entry and does not look like an id
    /// is treated as a list name, so it is created under the same rules as
    /// `listName`.
    async fn resolve_list(
        &self,
        proposal: &TaskProposal,
        lists: &[CatalogEntity],
        options: &CreateOptions,
    ) -> TaskCreationResult<Resolution> {
        if let Some(list_id) = proposal
            .list_id()
            .filter(|id| fuzzy_find(lists, id).is_none() && looks_like_id(id))
        {
            return Ok(Resolution::assumed(list_id));
        }

        let Some(requested) = proposal.list_id().or_else(|| proposal.list_name()) else {
            return lists
                .first()
                .map(Resolution::existing)
                .ok_or(TaskCreationError::NoListAvailable);
        };

        let dry_run = options.dry_run();
        let board = &self.board;
        let resolution = resolve_or_create(
            EntityKind::List,
            lists,
            requested,
            !options.disallow_create(),
            || async move {
                if dry_run {
                    Ok(planned_entity(requested, None))
                } else {
                    board.create_list(requested).await
                }
            },
        )
        .await?;
        if resolution.was_created && !dry_run {
            info!(list_id = %resolution.id, list_name = requested, "created list");
        }
        Ok(resolution)
    }

    async fn resolve_labels(
        &self,
        requested: &[String],
        options: &CreateOptions,
    ) -> TaskCreationResult<Vec<Resolution>> {
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let mut catalog = self.board.fetch_labels().await?;
        CatalogEntity::sort_by_position(&mut catalog);
        let dry_run = options.dry_run();
        let color = self.settings.default_label_color();
        let board = &self.board;
        let mut resolved = Vec::with_capacity(requested.len());

        for label in requested {
            if looks_like_id(label) {
                resolved.push(Resolution::assumed(label));
                continue;
            }
            let resolution = resolve_or_create(
                EntityKind::Label,
                &catalog,
                label,
                !options.disallow_create(),
                || async move {
                    if dry_run {
                        Ok(planned_entity(label, Some(color)))
                    } else {
                        board.create_label(label, color).await
                    }
                },
            )
            .await?;
            debug!(
                label = %label,
                label_id = %resolution.id,
                created = resolution.was_created,
                "resolved label"
            );
            if resolution.was_created {
                // Later entries naming the same label must reuse it.
                catalog.push(
                    CatalogEntity::new(resolution.id.as_str(), resolution.name.as_str(), f64::MAX)
                        .with_color(color),
                );
            }
            resolved.push(resolution);
        }
        Ok(resolved)
    }

    fn build_payload(
        &self,
        proposal: &TaskProposal,
        labels: &[Resolution],
        key: Option<&IdempotencyKey>,
    ) -> CardPayload {
        let base = proposal
            .description()
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| proposal.title());
        let description = key.map_or_else(|| base.to_owned(), |marker| marker.append_marker(base));

        CardPayload {
            name: proposal.title().to_owned(),
            description,
            label_ids: labels.iter().map(|label| label.id.clone()).collect(),
            due_date: proposal
                .due_date()
                .and_then(|text| self.parse_due_date(text)),
        }
    }

    /// Reads a due date as a timestamp first, then as a natural-language
    /// phrase; an unreadable value leaves the card without a due date.
    fn parse_due_date(&self, text: &str) -> Option<DateTime<Utc>> {
        let now = self.clock.local();
        let parsed = parse_timestamp(text, &now.timezone())
            .or_else(|| parse_date(text, self.settings.locale(), &now))
            .map(|instant| instant.with_timezone(&Utc));
        if parsed.is_none() {
            debug!(due_date = text, "due date not understood, card gets none");
        }
        parsed
    }

    async fn find_existing(
        &self,
        proposal: &TaskProposal,
        requested_key: Option<&IdempotencyKey>,
        list: &Resolution,
    ) -> Option<CreationOutcome> {
        let key = requested_key?;
        let cards = match self.board.fetch_all_cards().await {
            Ok(cards) => cards,
            Err(err) => {
                warn!(error = %err, "idempotency check failed, continuing as no match");
                return None;
            }
        };

        let existing = find_existing_card(
            &cards,
            key,
            proposal.title(),
            Some(&list.id),
            proposal.list_name(),
        )?;
        let local_task_id = self
            .store
            .find_by_remote_id(&existing.card_id)
            .await
            .map(|found| found.map(|task| task.id().clone()))
            .unwrap_or_else(|err| {
                warn!(
                    card_id = %existing.card_id,
                    error = %err,
                    "local task lookup failed"
                );
                None
            });
        info!(
            card_id = %existing.card_id,
            matched_by = ?existing.matched_by,
            "found existing card"
        );

        Some(CreationOutcome::Existed {
            card_id: existing.card_id,
            local_task_id,
            matched_by: existing.matched_by,
        })
    }

    async fn create_card(
        &self,
        proposal: &TaskProposal,
        list: Resolution,
        labels: Vec<Resolution>,
        payload: &CardPayload,
    ) -> TaskCreationResult<CreationOutcome> {
        let card = self.board.create_card(&list.id, payload).await?;
        info!(card_id = %card.id, list_id = %list.id, "created card");

        let task_list_id = self
            .create_subtasks(&card.id, proposal.subtasks())
            .await
            .inspect_err(|err| {
                warn!(
                    card_id = %card.id,
                    error = %err,
                    "card created but its subtasks are incomplete"
                );
            })?;

        let synced = self
            .record_locally(proposal, &card.id)
            .await
            .inspect_err(|err| {
                warn!(
                    card_id = %card.id,
                    error = %err,
                    "card created but not recorded locally"
                );
            })?;
        info!(card_id = %card.id, task_id = %synced.id(), "recorded local task");

        Ok(CreationOutcome::Created(CreatedCard {
            card_id: card.id,
            task_id: synced.id().clone(),
            list,
            labels_created: labels.into_iter().filter(|label| label.was_created).collect(),
            task_list_id,
        }))
    }

    async fn record_locally(
        &self,
        proposal: &TaskProposal,
        card_id: &EntityId,
    ) -> Result<LocalTask, TaskStoreError> {
        let task = LocalTask::from_proposal(proposal, &*self.clock);
        self.store.record(&task).await?;
        self.store
            .mark_synced(task.id(), card_id, self.clock.utc())
            .await
    }

    /// Creates one task list holding every subtask, in order.
    async fn create_subtasks(
        &self,
        card_id: &EntityId,
        subtasks: &[String],
    ) -> Result<Option<EntityId>, BoardError> {
        if subtasks.is_empty() {
            return Ok(None);
        }
        let task_list_id = self
            .board
            .create_task_list(card_id, self.settings.task_list_name())
            .await?;
        for subtask in subtasks {
            self.board
                .create_task_item(&task_list_id, subtask, false)
                .await?;
        }
        Ok(Some(task_list_id))
    }
}

/// Stand-in for an entity a dry run would create.
fn planned_entity(name: &str, color: Option<&str>) -> CatalogEntity {
    CatalogEntity {
        color: color.map(str::to_owned),
        ..CatalogEntity::new(format!("{PLANNED_ID_PREFIX}{name}"), name, f64::MAX)
    }
}
