//! Core error types for focusmate-core.
//!
//! One thiserror enum per concern, folded into [`CoreError`] so the
//! command layer can propagate anything with `?`.

use std::path::PathBuf;
use thiserror::Error;

use crate::dialog::DialogStage;
use crate::profile::UserId;

/// Core error type for focusmate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A message arrived outside the expected dialog sequence
    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),

    /// Profile storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Report export failed; the profile is untouched
    #[error("Export failed: {0}")]
    Report(#[from] ReportError),
}

/// Contract violations raised by the dialog engine.
///
/// None of these mutate the profile or the stored dialog state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// Dialog input with no dialog in progress
    #[error("no dialog in progress for user {user}")]
    NoActiveDialog { user: UserId },

    /// The input kind does not fit the current stage (text where a choice is expected, or vice versa)
    #[error("unexpected input at {stage:?}: {input}")]
    UnexpectedInput { stage: DialogStage, input: String },

    /// The elaboration index does not address a pending task
    #[error("task index {index} out of range ({len} pending)")]
    TaskIndexOutOfRange { index: usize, len: usize },

    /// A task batch with no non-empty lines
    #[error("no tasks in input")]
    NoPendingTasks,

    /// A draft reached the planner without a time specification
    #[error("task draft '{task}' has no time allocated")]
    IncompleteDraft { task: String },
}

/// Profile storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite failure
    #[error("Query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Profile could not be encoded or decoded
    #[error("Profile serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock
    #[error("Profile store lock poisoned")]
    Poisoned,

    /// Failed to open the database file
    #[error("Failed to open database at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dotted key that names no config field
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Report rendering errors.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("renderer failed: {0}")]
    RenderFailed(String),

    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Outbound delivery errors. Logged by callers, never retried.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("delivery to user {user} failed: {message}")]
    DeliveryFailed { user: UserId, message: String },
}

/// Time specifications that are neither `HH:MM` nor a bare minute count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeSpecError {
    #[error("unrecognized time specification '{0}'")]
    Unrecognized(String),
}

impl From<std::sync::PoisonError<std::sync::MutexGuard<'_, rusqlite::Connection>>> for StoreError {
    fn from(_: std::sync::PoisonError<std::sync::MutexGuard<'_, rusqlite::Connection>>) -> Self {
        StoreError::Poisoned
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
