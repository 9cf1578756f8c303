//! Free text to proposal, with optional hand-off to creation.

use super::{
    CreateOptions, CreationOutcome, IntakeSettings, TaskCreationError, TaskCreationService,
};
use crate::intake::{
    domain::{
        CatalogEntity, END_OF_NEXT_WEEK, IdempotencyKey, TaskProposal, end_of_day,
        end_of_next_week, extract, extract_date_phrase, fuzzy_find, parse_date,
    },
    ports::{BoardError, BoardGateway, LocalTaskStore},
};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use mockable::Clock;
use regex::Regex;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Leading cue words dropped when a date phrase does not parse as a whole.
const DATE_CUE_WORDS: [&str; 3] = ["until", "by", "due"];

/// How far an interpretation goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpretOptions {
    create: bool,
    dry_run: bool,
    disallow_create: bool,
}

impl InterpretOptions {
    /// Infers the proposal only; the board is read but never changed.
    #[must_use]
    pub const fn infer() -> Self {
        Self {
            create: false,
            dry_run: false,
            disallow_create: false,
        }
    }

    /// Hands the inferred proposal to the creation flow.
    #[must_use]
    pub const fn create() -> Self {
        Self {
            create: true,
            dry_run: false,
            disallow_create: false,
        }
    }

    /// Runs the creation flow as a dry run.
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

    /// Returns whether creation is requested.
    #[must_use]
    pub const fn creates(&self) -> bool {
        self.create
    }
}

/// What was read from the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    /// The inferred proposal.
    pub proposal: TaskProposal,
    /// Key derived from title, board, and target list.
    pub idempotency_key: IdempotencyKey,
    /// The date phrase found in the text, if any.
    pub date_phrase: Option<String>,
}

impl Interpretation {
    /// Renders the proposal with its key, as reported for inference runs.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut payload = serde_json::to_value(&self.proposal).unwrap_or_else(|_| json!({}));
        if let Some(fields) = payload.as_object_mut() {
            fields.insert(
                "idempotencyKey".to_owned(),
                Value::String(self.idempotency_key.as_str().to_owned()),
            );
        }
        payload
    }
}

/// Result of interpreting text.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretOutcome {
    /// What was read from the text.
    pub interpretation: Interpretation,
    /// Creation result, when creation was requested.
    pub creation: Option<CreationOutcome>,
}

impl InterpretOutcome {
    /// Renders the creation result, or `{ "simulated": true, "payload": .. }`
    /// with the inferred proposal when nothing was handed to creation.
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.creation.as_ref().map_or_else(
            || json!({ "simulated": true, "payload": self.interpretation.to_json() }),
            CreationOutcome::to_json,
        )
    }
}

/// Service-level errors for interpretation.
#[derive(Debug, Error)]
pub enum InterpretError {
    /// The text is blank or leaves nothing to use as a title.
    #[error("no text to interpret")]
    EmptyInput,

    /// Reading the board catalog failed.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// The creation flow failed.
    #[error(transparent)]
    Creation(#[from] TaskCreationError),
}

/// Result type for interpretation.
pub type InterpretResult<T> = Result<T, InterpretError>;

/// Turns sentences into proposals and optionally creates them.
pub struct InterpretService<B, S, C>
where
    B: BoardGateway,
    S: LocalTaskStore,
    C: Clock + Send + Sync,
{
    board: Arc<B>,
    clock: Arc<C>,
    creation: TaskCreationService<B, S, C>,
}

impl<B, S, C> InterpretService<B, S, C>
where
    B: BoardGateway,
    S: LocalTaskStore,
    C: Clock + Send + Sync,
{
    /// Creates an interpretation service sharing its collaborators with an
    /// internal creation service.
    #[must_use]
    pub fn new(board: Arc<B>, store: Arc<S>, clock: Arc<C>, settings: IntakeSettings) -> Self {
        let creation =
            TaskCreationService::new(Arc::clone(&board), store, Arc::clone(&clock), settings);
        Self {
            board,
            clock,
            creation,
        }
    }

    /// Interprets `text` and, when `options` ask for it, creates the card.
    ///
    /// # Errors
    ///
    /// Returns [`InterpretError::EmptyInput`] for blank text,
    /// [`InterpretError::Board`] when the catalog cannot be read, and
    /// [`InterpretError::Creation`] when the creation flow fails.
    pub async fn interpret(
        &self,
        text: &str,
        options: InterpretOptions,
    ) -> InterpretResult<InterpretOutcome> {
        if text.trim().is_empty() {
            return Err(InterpretError::EmptyInput);
        }

        let mut lists = self.board.fetch_lists().await?;
        CatalogEntity::sort_by_position(&mut lists);
        let mut labels = self.board.fetch_labels().await?;
        CatalogEntity::sort_by_position(&mut labels);

        let interpretation = self.read_text(text, &lists, &labels)?;
        debug!(
            title = interpretation.proposal.title(),
            list = ?interpretation.proposal.list_name(),
            key = %interpretation.idempotency_key,
            "interpreted text"
        );
        if !options.creates() {
            return Ok(InterpretOutcome {
                interpretation,
                creation: None,
            });
        }

        let create_options = CreateOptions::new()
            .with_dry_run(options.dry_run)
            .with_disallow_create(options.disallow_create)
            .with_idempotency_key(interpretation.idempotency_key.clone());
        let creation = self
            .creation
            .create(&interpretation.proposal, &create_options)
            .await?;
        Ok(InterpretOutcome {
            interpretation,
            creation: Some(creation),
        })
    }

    fn read_text(
        &self,
        text: &str,
        lists: &[CatalogEntity],
        labels: &[CatalogEntity],
    ) -> InterpretResult<Interpretation> {
        let settings = self.creation.settings();
        let extraction = extract(text);
        if extraction.title.is_empty() {
            return Err(InterpretError::EmptyInput);
        }

        let date_phrase = extract_date_phrase(text);
        let due_date = date_phrase
            .as_deref()
            .and_then(|phrase| resolve_due_date(phrase, settings, &self.clock.local()));
        let label_names: Vec<String> = extraction
            .labels
            .into_iter()
            .map(|guessed| {
                fuzzy_find(labels, &guessed).map_or(guessed, |label| label.name.clone())
            })
            .collect();
        let list_name = guess_list(text, lists, settings.fallback_list_name());

        let mut proposal = TaskProposal::new(extraction.title)
            .with_description(extraction.description)
            .with_labels(label_names);
        if let Some(name) = &list_name {
            proposal = proposal.with_list_name(name.as_str());
        }
        if let Some(due) = due_date {
            proposal = proposal.with_due_date(due.to_rfc3339_opts(SecondsFormat::Millis, true));
        }
        let idempotency_key = settings.idempotency_key(proposal.title(), list_name.as_deref());

        Ok(Interpretation {
            proposal,
            idempotency_key,
            date_phrase,
        })
    }
}

/// Turns a date phrase into an end-of-day UTC deadline.
fn resolve_due_date<Tz: TimeZone>(
    phrase: &str,
    settings: &IntakeSettings,
    now: &DateTime<Tz>,
) -> Option<DateTime<Utc>> {
    if phrase == END_OF_NEXT_WEEK {
        return Some(end_of_next_week(now).with_timezone(&Utc));
    }
    parse_date(phrase, settings.locale(), now)
        .or_else(|| {
            strip_cue_word(phrase).and_then(|rest| parse_date(rest, settings.locale(), now))
        })
        .map(|parsed| end_of_day(&parsed).with_timezone(&Utc))
}

fn strip_cue_word(phrase: &str) -> Option<&str> {
    let trimmed = phrase.trim_start();
    let (first, rest) = trimmed.split_once(char::is_whitespace)?;
    DATE_CUE_WORDS
        .iter()
        .any(|cue| first.eq_ignore_ascii_case(cue))
        .then(|| rest.trim())
}

/// Picks the list a sentence most likely targets: a list matching the whole
/// text, then a list the text mentions by name, then the fallback list.
fn guess_list(text: &str, lists: &[CatalogEntity], fallback: &str) -> Option<String> {
    fuzzy_find(lists, text)
        .or_else(|| lists.iter().find(|list| mentions(text, &list.name)))
        .or_else(|| fuzzy_find(lists, fallback))
        .map(|list| list.name.clone())
}

/// Whether `text` contains `name` as a whole word or phrase, ignoring case.
fn mentions(text: &str, name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && Regex::new(&format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(trimmed)))
            .is_ok_and(|pattern| pattern.is_match(text))
}
