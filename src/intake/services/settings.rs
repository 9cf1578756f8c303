//! Explicit settings shared by the intake services.

use crate::intake::domain::{BoardId, IdempotencyKey, Locale};

/// Color given to labels created during resolution.
pub const DEFAULT_LABEL_COLOR: &str = "morning-sky";

/// Name of the task list that holds a card's subtasks.
pub const DEFAULT_TASK_LIST_NAME: &str = "Tasks";

/// List used by interpretation when the text names no list.
pub const DEFAULT_FALLBACK_LIST_NAME: &str = "open llm tasks";

/// Board selection and defaults for one intake run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSettings {
    board_id: BoardId,
    locale: Locale,
    default_label_color: String,
    task_list_name: String,
    fallback_list_name: String,
}

impl IntakeSettings {
    /// Creates settings for `board_id` with default locale and names.
    #[must_use]
    pub fn new(board_id: BoardId) -> Self {
        Self {
            board_id,
            locale: Locale::default(),
            default_label_color: DEFAULT_LABEL_COLOR.to_owned(),
            task_list_name: DEFAULT_TASK_LIST_NAME.to_owned(),
            fallback_list_name: DEFAULT_FALLBACK_LIST_NAME.to_owned(),
        }
    }

    /// Sets the locale used to read numeric dates.
    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the color for created labels.
    #[must_use]
    pub fn with_default_label_color(mut self, color: impl Into<String>) -> Self {
        self.default_label_color = color.into();
        self
    }

    /// Sets the name of the subtask task list.
    #[must_use]
    pub fn with_task_list_name(mut self, name: impl Into<String>) -> Self {
        self.task_list_name = name.into();
        self
    }

    /// Sets the list interpretation falls back to.
    #[must_use]
    pub fn with_fallback_list_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_list_name = name.into();
        self
    }

    /// Returns the target board.
    #[must_use]
    pub const fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// Returns the date locale.
    #[must_use]
    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Returns the color for created labels.
    #[must_use]
    pub fn default_label_color(&self) -> &str {
        &self.default_label_color
    }

    /// Returns the subtask task list name.
    #[must_use]
    pub fn task_list_name(&self) -> &str {
        &self.task_list_name
    }

    /// Returns the interpretation fallback list name.
    #[must_use]
    pub fn fallback_list_name(&self) -> &str {
        &self.fallback_list_name
    }

    /// Derives the idempotency key for a task on this board.
    #[must_use]
    pub fn idempotency_key(&self, title: &str, list_name: Option<&str>) -> IdempotencyKey {
        IdempotencyKey::derive(title, &self.board_id, list_name)
    }
}
