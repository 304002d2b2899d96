//! Core error types for stagehand-core
//!
//! This module provides the error type shared by the staging engine,
//! the focus router and the task runner.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use toml::de::Error as ConfigParseError;

/// Core errors that can occur while routing input or applying actions.
///
/// None of these are fatal. User-input errors are shown inline, mutation
/// errors are shown verbatim and the user can retry a [`CoreError::Busy`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// The refresh guard could not be acquired within the bounded wait.
    ///
    /// A status refresh is reading the working tree; the action was not
    /// attempted and can be retried.
    #[error("files are being refreshed, try again")]
    Busy,

    /// An action that needs a selection was invoked with an empty one.
    #[error("no item selected")]
    NothingSelected,

    /// A context key was not registered with the focus router.
    #[error("context not found: {0}")]
    ContextNotFound(String),

    /// A context exists but cannot receive focus.
    #[error("context is not focusable: {0}")]
    NotFocusable(String),

    /// A background task is already running for this invocation site.
    #[error("already running: {0}")]
    TaskBusy(String),

    /// Commit was requested with a blank message.
    #[error("commit message is empty")]
    EmptyCommitMessage,

    /// Commit was requested but nothing is staged.
    #[error("no staged files")]
    NoStagedFiles,

    /// The push button was activated without a push handler.
    #[error("push action unavailable")]
    PushUnavailable,

    /// A working-tree mutation failed; the message is shown as-is.
    #[error("{0}")]
    Mutation(String),

    /// A key binding string could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Configuration file could not be parsed.
    #[error("invalid config at {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: ConfigParseError,
    },

    /// Event system error, such as a closed UI queue.
    #[error("event error: {0}")]
    EventError(String),

    /// Underlying IO error bubbled up from filesystem operations.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Returns true for errors caused by what the user asked for rather
    /// than by a failing collaborator.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::NothingSelected
                | CoreError::EmptyCommitMessage
                | CoreError::NoStagedFiles
                | CoreError::Busy
                | CoreError::TaskBusy(_)
        )
    }
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
