//! Error types for direction management and its collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of the persisted preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preference file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode preferences: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the process restart primitive.
#[derive(Debug, Error)]
pub enum RestartError {
    #[error("failed to relaunch process: {0}")]
    Io(#[from] std::io::Error),

    #[error("restart refused by platform: {0}")]
    Refused(String),
}

/// Failure to record the layout direction for the next launch.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host direction I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode host direction: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("host rejected direction change: {0}")]
    Rejected(String),
}

/// Invalid language selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageError {
    #[error("Unknown language code: '{0}'")]
    Unknown(String),

    #[error("Language '{0}' is not enabled")]
    Disabled(String),
}

/// Errors surfaced by `DirectionManager` to its callers.
///
/// Store read failures never appear here: startup falls back to the
/// default language instead.
#[derive(Debug, Error)]
pub enum DirectionError {
    /// The new preference (or the restart guard) could not be persisted.
    /// The change was not applied and no restart was scheduled.
    #[error("failed to persist language preference: {0}")]
    StoreWrite(#[source] StoreError),

    /// The restart primitive failed. The preference and restart guard stay
    /// persisted; the user has to relaunch manually.
    #[error("restart failed, manual relaunch required: {0}")]
    Restart(#[from] RestartError),

    #[error("failed to apply layout direction for next launch: {0}")]
    Host(#[from] HostError),

    #[error("direction manager is not initialized")]
    NotInitialized,

    #[error("a restart is already pending")]
    RestartPending,

    #[error("a previous restart failed; relaunch the app to change direction")]
    RelaunchRequired,

    #[error(transparent)]
    Language(#[from] LanguageError),
}

impl DirectionError {
    /// Whether the UI should show the manual relaunch instruction.
    pub fn requires_manual_relaunch(&self) -> bool {
        matches!(
            self,
            DirectionError::Restart(_) | DirectionError::RelaunchRequired
        )
    }
}
