//! Local task store persisted as a `tasks.json` document.
//!
//! The document layout is `{ "tasks": [..], "lastSync": .., "metadata": {
//! "version", "description", "boardId" } }`. A missing file reads as an empty
//! store and is created on the first write. Every operation is a full
//! read-modify-write on a blocking thread, serialized by a process-local lock.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};

use crate::intake::{
    domain::{BoardId, EntityId, LocalTask, LocalTaskId},
    ports::{LocalTaskStore, TaskStoreError, TaskStoreResult},
};

const DOCUMENT_VERSION: &str = "1.0.0";
const DOCUMENT_DESCRIPTION: &str = "Task management for Planka integration";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    #[serde(default)]
    tasks: Vec<LocalTask>,
    #[serde(default)]
    last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    metadata: DocumentMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentMetadata {
    version: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    board_id: Option<BoardId>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_owned(),
            description: DOCUMENT_DESCRIPTION.to_owned(),
            board_id: None,
        }
    }
}

/// File-backed local task store.
#[derive(Debug, Clone)]
pub struct JsonFileTaskStore {
    inner: Arc<StoreFile>,
}

#[derive(Debug)]
struct StoreFile {
    path: Utf8PathBuf,
    board_id: Option<BoardId>,
    lock: Mutex<()>,
}

impl JsonFileTaskStore {
    /// Creates a store backed by the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            inner: Arc::new(StoreFile {
                path: path.into(),
                board_id: None,
                lock: Mutex::new(()),
            }),
        }
    }

    /// Creates a store that stamps `board_id` into the document metadata.
    #[must_use]
    pub fn for_board(path: impl Into<Utf8PathBuf>, board_id: BoardId) -> Self {
        Self {
            inner: Arc::new(StoreFile {
                path: path.into(),
                board_id: Some(board_id),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.inner.path
    }

    /// Returns every recorded task in document order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the document cannot be
    /// read or parsed.
    pub async fn tasks(&self) -> TaskStoreResult<Vec<LocalTask>> {
        self.run(|document| Ok((document.tasks.clone(), false)))
            .await
    }

    /// Returns tasks not yet synced to the board.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the document cannot be
    /// read or parsed.
    pub async fn pending_tasks(&self) -> TaskStoreResult<Vec<LocalTask>> {
        let tasks = self.tasks().await?;
        Ok(tasks.into_iter().filter(|task| !task.is_synced()).collect())
    }

    /// Loads the document, applies `operation`, and writes it back when the
    /// operation reports a change.
    async fn run<F, T>(&self, operation: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut TaskDocument) -> TaskStoreResult<(T, bool)> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || store.apply(operation))
            .await
            .map_err(TaskStoreError::persistence)?
    }
}

impl StoreFile {
    fn apply<F, T>(&self, operation: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut TaskDocument) -> TaskStoreResult<(T, bool)>,
    {
        let _guard = self.lock.lock().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut document = self.load()?;
        let (value, changed) = operation(&mut document)?;
        if changed {
            self.save(&mut document)?;
        }
        Ok(value)
    }

    fn file_name(&self) -> TaskStoreResult<&str> {
        self.path.file_name().ok_or_else(|| {
            TaskStoreError::persistence(std::io::Error::other(format!(
                "task store path has no file name: {}",
                self.path
            )))
        })
    }

    fn parent(&self) -> &Utf8Path {
        self.path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."))
    }

    fn load(&self) -> TaskStoreResult<TaskDocument> {
        let file_name = self.file_name()?;
        let dir = match Dir::open_ambient_dir(self.parent(), ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(TaskDocument::default()),
            Err(err) => return Err(TaskStoreError::persistence(err)),
        };
        match dir.read_to_string(file_name) {
            Ok(contents) => serde_json::from_str(&contents).map_err(TaskStoreError::persistence),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(TaskDocument::default()),
            Err(err) => Err(TaskStoreError::persistence(err)),
        }
    }

    fn save(&self, document: &mut TaskDocument) -> TaskStoreResult<()> {
        let file_name = self.file_name()?;
        if let Some(board_id) = &self.board_id {
            document.metadata.board_id = Some(board_id.clone());
        }
        let contents =
            serde_json::to_string_pretty(document).map_err(TaskStoreError::persistence)?;
        Dir::create_ambient_dir_all(self.parent(), ambient_authority())
            .map_err(TaskStoreError::persistence)?;
        let dir = Dir::open_ambient_dir(self.parent(), ambient_authority())
            .map_err(TaskStoreError::persistence)?;
        dir.write(file_name, contents)
            .map_err(TaskStoreError::persistence)
    }
}

#[async_trait]
impl LocalTaskStore for JsonFileTaskStore {
    async fn find_by_remote_id(&self, card_id: &EntityId) -> TaskStoreResult<Option<LocalTask>> {
        let wanted = card_id.clone();
        self.run(move |document| {
            let found = document
                .tasks
                .iter()
                .find(|task| task.remote_card_id() == Some(&wanted))
                .cloned();
            Ok((found, false))
        })
        .await
    }

    async fn record(&self, task: &LocalTask) -> TaskStoreResult<()> {
        let recorded = task.clone();
        self.run(move |document| {
            document.tasks.retain(|existing| existing.id() != recorded.id());
            document.tasks.push(recorded);
            Ok(((), true))
        })
        .await
    }

    async fn mark_synced(
        &self,
        id: &LocalTaskId,
        card_id: &EntityId,
        synced_at: DateTime<Utc>,
    ) -> TaskStoreResult<LocalTask> {
        let wanted = id.clone();
        let remote = card_id.clone();
        self.run(move |document| {
            let task = document
                .tasks
                .iter_mut()
                .find(|task| task.id() == &wanted)
                .ok_or_else(|| TaskStoreError::NotFound(wanted.clone()))?;
            task.mark_synced(remote, synced_at);
            let synced = task.clone();
            document.last_sync = Some(synced_at);
            Ok((synced, true))
        })
        .await
    }
}
