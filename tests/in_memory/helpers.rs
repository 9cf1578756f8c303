//! Shared fixtures for the end-to-end intake tests.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Local, TimeZone, Utc};
use kanban_intake::intake::{
    adapters::memory::{BoardSnapshot, InMemoryBoard},
    domain::{BoardId, CatalogEntity, Locale},
    services::IntakeSettings,
};
use mockable::Clock;
use rstest::fixture;

/// Clock frozen at Saturday 2025-10-25 09:00 UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Returns the frozen instant.
    pub const fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Provides the frozen clock.
#[fixture]
pub fn clock() -> FixedClock {
    FixedClock(
        Utc.with_ymd_and_hms(2025, 10, 25, 9, 0, 0)
            .single()
            .expect("valid instant"),
    )
}

/// Provides settings for board `board-1` read with a day-first locale.
#[fixture]
pub fn settings() -> IntakeSettings {
    IntakeSettings::new(BoardId::new("board-1")).with_locale(Locale::new("de-CH"))
}

/// Provides a board with two lists and one label.
#[fixture]
pub fn board() -> InMemoryBoard {
    InMemoryBoard::with_snapshot(
        BoardSnapshot::default()
            .with_list(CatalogEntity::new("5f2a9c1e0b", "Backlog", 65_536.0))
            .with_list(CatalogEntity::new("5f2a9c1e0c", "open llm tasks", 131_072.0))
            .with_label(
                CatalogEntity::new("7d41b0aa01", "docs", 65_536.0).with_color("berry-red"),
            ),
    )
}

/// Scratch directory removed when dropped.
pub struct ScratchDir {
    root: Utf8PathBuf,
}

impl ScratchDir {
    /// Creates a uniquely named directory under the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp dir is not UTF-8 or cannot be written.
    pub fn create() -> eyre::Result<Self> {
        let base = Utf8PathBuf::from_path_buf(std::env::temp_dir())
            .map_err(|path| eyre::eyre!("temp dir is not UTF-8: {}", path.display()))?;
        let root = base.join(format!("kanban-intake-{}", uuid::Uuid::new_v4()));
        Dir::create_ambient_dir_all(&root, ambient_authority())?;
        Ok(Self { root })
    }

    /// Returns `name` inside the directory.
    pub fn join(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Reads `name` inside the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, name: &str) -> eyre::Result<String> {
        let dir = Dir::open_ambient_dir(&self.root, ambient_authority())?;
        Ok(dir.read_to_string(name)?)
    }

    /// Writes `contents` to `name` inside the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> eyre::Result<()> {
        let dir = Dir::open_ambient_dir(&self.root, ambient_authority())?;
        dir.write(name, contents)?;
        Ok(())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let (Some(parent), Some(name)) = (self.root.parent(), self.root.file_name()) else {
            return;
        };
        if let Ok(dir) = Dir::open_ambient_dir(parent, ambient_authority()) {
            drop(dir.remove_dir_all(name));
        }
    }
}
