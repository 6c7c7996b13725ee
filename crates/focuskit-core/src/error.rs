//! Error types for focuskit-core.
//!
//! Persistence failures are deliberately absent from most public command
//! signatures: the storage adapter logs and swallows them so the in-memory
//! state stays authoritative. The types here cover the paths that do
//! surface -- opening the backing store, config IO, and timer preconditions.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for focuskit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("timer error: {0}")]
    Timer(#[from] TimerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the key-value store backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database file.
    #[error("failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A read or write against the kv table failed.
    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Configuration load/save errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Precondition failures for timer commands.
///
/// `NoTaskSelected` is the one rejection surfaced to the user as a blocking
/// notice; starting a focus countdown requires a selected task.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    #[error("the timer is already running")]
    AlreadyRunning,

    #[error("select a task before starting a focus interval")]
    NoTaskSelected,
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
