//! Log output configuration.
//!
//! Verbosity is an explicit [`LogSettings`] value; nothing in the crate holds
//! logging state of its own. `RUST_LOG` overrides the level derived from the
//! settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;

/// Verbosity switches for log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Emits resolution decisions and other debug events.
    #[serde(default)]
    pub verbose: bool,
    /// Keeps only warnings and errors; wins over `verbose`.
    #[serde(default)]
    pub silent: bool,
}

impl LogSettings {
    /// Returns the default filter directive for these settings.
    #[must_use]
    pub const fn level(&self) -> &'static str {
        if self.silent {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Errors raised while installing a subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Another global subscriber is already installed.
    #[error(transparent)]
    AlreadyInstalled(#[from] SetGlobalDefaultError),
}

/// Builds a stderr subscriber honouring `settings` and `RUST_LOG`.
///
/// Install it for a scope with [`tracing::subscriber::with_default`] or
/// process-wide with [`init`].
#[must_use]
pub fn subscriber(settings: &LogSettings) -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish()
}

/// Installs the subscriber for `settings` as the global default.
///
/// # Errors
///
/// Returns [`TelemetryError::AlreadyInstalled`] when a global subscriber
/// exists.
pub fn init(settings: &LogSettings) -> Result<(), TelemetryError> {
    tracing::subscriber::set_global_default(subscriber(settings))?;
    Ok(())
}
