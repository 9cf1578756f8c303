//! Task proposal: the structured, pre-resolution description of a card.

use super::ProposalError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A task to be created on the board.
///
/// Either `list_id` or `list_name` steers list resolution; `list_id` wins when
/// both are present. Labels are names or board identifiers, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProposal {
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subtasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
}

impl TaskProposal {
    /// Creates a proposal with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            list_name: None,
            list_id: None,
            labels: Vec::new(),
            subtasks: Vec::new(),
            due_date: None,
        }
    }

    /// Builds a proposal from loosely typed JSON, checking each field's type.
    ///
    /// `null` and empty strings count as absent for optional fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProposalError`] naming the first offending field.
    pub fn from_json(value: &Value) -> Result<Self, ProposalError> {
        let object = value.as_object().ok_or(ProposalError::NotAnObject)?;
        let title = match object.get("title") {
            Some(Value::String(title)) if !title.trim().is_empty() => title.clone(),
            _ => return Err(ProposalError::MissingTitle),
        };

        Ok(Self {
            title,
            description: optional_string(object, "description", "a string")?,
            list_name: optional_string(object, "listName", "a string")?,
            list_id: optional_string(object, "listId", "a string")?,
            labels: string_list(object, "labels")?,
            subtasks: string_list(object, "subtasks")?,
            due_date: optional_string(object, "dueDate", "a string (ISO or natural language)")?,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the target list by name.
    #[must_use]
    pub fn with_list_name(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = Some(list_name.into());
        self
    }

    /// Sets the target list by board identifier.
    #[must_use]
    pub fn with_list_id(mut self, list_id: impl Into<String>) -> Self {
        self.list_id = Some(list_id.into());
        self
    }

    /// Sets label names or identifiers.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }

    /// Sets subtask titles.
    #[must_use]
    pub fn with_subtasks(mut self, subtasks: impl IntoIterator<Item = String>) -> Self {
        self.subtasks = subtasks.into_iter().collect();
        self
    }

    /// Sets the due date expression (ISO timestamp or natural language).
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Checks the invariants that typed construction cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`ProposalError::MissingTitle`] for a blank title and
    /// [`ProposalError::EmptyEntry`] for a blank label or subtask.
    pub fn validate(&self) -> Result<(), ProposalError> {
        if self.title.trim().is_empty() {
            return Err(ProposalError::MissingTitle);
        }
        ensure_entries(&self.labels, "labels")?;
        ensure_entries(&self.subtasks, "subtasks")
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the requested list name, if any.
    #[must_use]
    pub fn list_name(&self) -> Option<&str> {
        self.list_name.as_deref()
    }

    /// Returns the requested list identifier, if any.
    #[must_use]
    pub fn list_id(&self) -> Option<&str> {
        self.list_id.as_deref()
    }

    /// Returns the requested labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the subtask titles.
    #[must_use]
    pub fn subtasks(&self) -> &[String] {
        &self.subtasks
    }

    /// Returns the due date expression, if any.
    #[must_use]
    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }
}

fn ensure_entries(entries: &[String], field: &'static str) -> Result<(), ProposalError> {
    match entries.iter().position(|entry| entry.trim().is_empty()) {
        Some(index) => Err(ProposalError::EmptyEntry { field, index }),
        None => Ok(()),
    }
}

fn optional_string(
    object: &Map<String, Value>,
    field: &'static str,
    expected: &'static str,
) -> Result<Option<String>, ProposalError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ProposalError::InvalidField { field, expected }),
    }
}

fn string_list(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ProposalError> {
    let invalid = ProposalError::InvalidField {
        field,
        expected: "an array of strings",
    };
    let entries = match object.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(invalid),
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::String(text) if text.trim().is_empty() => {
                Err(ProposalError::EmptyEntry { field, index })
            }
            Value::String(text) => Ok(text.clone()),
            _ => Err(invalid.clone()),
        })
        .collect()
}
