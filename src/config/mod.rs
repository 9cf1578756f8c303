//! Configuration loading and per-project board selection.
//!
//! The configuration lives in `~/.planka-cli/config.json`:
//!
//! ```json
//! {
//!   "default": { "PLANKA_BOARD_ID": "1650923458208925178" },
//!   "projects": { "/home/ana/work/api": { "PLANKA_BOARD_ID": "1650923458208925999" } },
//!   "intake": { "locale": "de-CH", "verbose": true }
//! }
//! ```
//!
//! A project whose directory contains the working directory takes
//! precedence, the deepest one winning, and keeps its task records next to
//! it. Keys the intake does not use, such as credentials, are ignored.

use crate::intake::domain::{BoardId, Locale};
use crate::intake::services::IntakeSettings;
use crate::telemetry::LogSettings;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Directory under the home directory holding configuration and records.
pub const CONFIG_DIR_NAME: &str = ".planka-cli";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Local task record file name.
pub const TASKS_FILE_NAME: &str = "tasks.json";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home directory cannot be determined or is not UTF-8.
    #[error("home directory is not available")]
    HomeDirectoryUnavailable,

    /// The configuration file cannot be read.
    #[error("cannot read configuration {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON of the expected shape.
    #[error("cannot parse configuration {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Neither the matching project nor the default names a board.
    #[error("no board configured for {working_dir}")]
    MissingBoardId {
        /// Directory the lookup was made for.
        working_dir: Utf8PathBuf,
    },
}

/// Board reference inside the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoardEntry {
    /// Board identifier.
    #[serde(rename = "PLANKA_BOARD_ID", default)]
    pub board_id: Option<String>,
}

/// Optional intake overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSection {
    /// Locale tag for numeric dates.
    #[serde(default)]
    pub locale: Option<String>,
    /// Color for created labels.
    #[serde(default)]
    pub default_label_color: Option<String>,
    /// Name of the subtask task list.
    #[serde(default)]
    pub task_list_name: Option<String>,
    /// List interpretation falls back to.
    #[serde(default)]
    pub fallback_list_name: Option<String>,
    /// Verbosity switches.
    #[serde(flatten)]
    pub log: LogSettings,
}

/// Raw contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    /// Board used outside every configured project.
    #[serde(default)]
    pub default: Option<BoardEntry>,
    /// Boards keyed by project directory.
    #[serde(default)]
    pub projects: BTreeMap<String, BoardEntry>,
    /// Intake overrides.
    #[serde(default)]
    pub intake: IntakeSection,
}

impl ConfigFile {
    /// Reads `config.json` from `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is malformed.
    pub fn read(config_dir: &Utf8Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        let contents = Dir::open_ambient_dir(config_dir, ambient_authority())
            .and_then(|dir| dir.read_to_string(CONFIG_FILE_NAME))
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Returns the deepest project directory containing `working_dir`.
    #[must_use]
    pub fn project_for(&self, working_dir: &Utf8Path) -> Option<(&Utf8Path, &BoardEntry)> {
        self.projects
            .iter()
            .map(|(dir, entry)| (Utf8Path::new(dir.as_str()), entry))
            .filter(|(dir, _)| working_dir.starts_with(dir))
            .max_by_key(|(dir, _)| dir.components().count())
    }
}

/// Configuration resolved for one working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    settings: IntakeSettings,
    tasks_path: Utf8PathBuf,
    project_dir: Option<Utf8PathBuf>,
    log: LogSettings,
}

impl IntakeConfig {
    /// Loads `~/.planka-cli/config.json` and resolves it for `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the home directory is unknown, the file
    /// cannot be read or parsed, or no board applies.
    pub fn load(working_dir: &Utf8Path) -> Result<Self, ConfigError> {
        Self::load_from(&default_config_dir()?, working_dir)
    }

    /// Loads the configuration file in `config_dir` and resolves it for
    /// `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or no
    /// board applies.
    pub fn load_from(config_dir: &Utf8Path, working_dir: &Utf8Path) -> Result<Self, ConfigError> {
        let file = ConfigFile::read(config_dir)?;
        Self::resolve(&file, config_dir, working_dir)
    }

    /// Resolves parsed configuration for `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBoardId`] when the selected entry names
    /// no board.
    pub fn resolve(
        file: &ConfigFile,
        config_dir: &Utf8Path,
        working_dir: &Utf8Path,
    ) -> Result<Self, ConfigError> {
        let project = file.project_for(working_dir);
        let entry = project.map_or(file.default.as_ref(), |(_, entry)| Some(entry));
        let board_id = entry
            .and_then(|board| board.board_id.as_deref())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingBoardId {
                working_dir: working_dir.to_owned(),
            })?;
        let project_dir = project.map(|(dir, _)| dir.to_owned());
        let tasks_path = project_dir
            .as_deref()
            .unwrap_or(config_dir)
            .join(TASKS_FILE_NAME);

        Ok(Self {
            settings: intake_settings(BoardId::new(board_id), &file.intake),
            tasks_path,
            project_dir,
            log: file.intake.log,
        })
    }

    /// Returns the intake settings.
    #[must_use]
    pub const fn settings(&self) -> &IntakeSettings {
        &self.settings
    }

    /// Returns the local task record file.
    #[must_use]
    pub fn tasks_path(&self) -> &Utf8Path {
        &self.tasks_path
    }

    /// Returns the matched project directory, if any.
    #[must_use]
    pub fn project_dir(&self) -> Option<&Utf8Path> {
        self.project_dir.as_deref()
    }

    /// Returns the log settings.
    #[must_use]
    pub const fn log(&self) -> &LogSettings {
        &self.log
    }
}

/// Returns `~/.planka-cli`.
///
/// # Errors
///
/// Returns [`ConfigError::HomeDirectoryUnavailable`] when the home directory
/// is unknown or not valid UTF-8.
pub fn default_config_dir() -> Result<Utf8PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    let utf8_home =
        Utf8PathBuf::from_path_buf(home).map_err(|_| ConfigError::HomeDirectoryUnavailable)?;
    Ok(utf8_home.join(CONFIG_DIR_NAME))
}

fn intake_settings(board_id: BoardId, section: &IntakeSection) -> IntakeSettings {
    let mut settings = IntakeSettings::new(board_id);
    if let Some(locale) = &section.locale {
        settings = settings.with_locale(Locale::new(locale.as_str()));
    }
    if let Some(color) = &section.default_label_color {
        settings = settings.with_default_label_color(color.as_str());
    }
    if let Some(name) = &section.task_list_name {
        settings = settings.with_task_list_name(name.as_str());
    }
    if let Some(name) = &section.fallback_list_name {
        settings = settings.with_fallback_list_name(name.as_str());
    }
    settings
}

#[cfg(test)]
mod tests;
