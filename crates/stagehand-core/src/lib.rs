//! # stagehand-core
//!
//! Core types for the stagehand staging TUI.
//!
//! This crate holds everything that does not draw to the terminal:
//! the file tree snapshots and selection model, the batch unstage
//! engine, the background task runner and the commit message helper.
//!
//! ## Core Abstractions
//!
//! - [`Controller`] - Behaviour attached to a [`Context`]
//! - [`Message`] - Actions produced by key bindings and clicks
//! - [`UiQueue`] - Single-consumer queue of UI-thread continuations
//! - [`TaskRunner`] - Labelled background jobs with per-site policies
//! - [`WorkingTree`] - Seam to the repository
//! - [`apply_staging_action`] - Partition a selection and unstage it
//! - [`Config`] - Key bindings and settings from `config.toml`
//! - [`CoreError`] - Error types for all of the above
//!
//! ## Example
//!
//! ```
//! use stagehand_core::{DisplayFilter, FileEntry, FileTreeViewModel, Selection};
//!
//! let mut model = FileTreeViewModel::new(true, DisplayFilter::Staged);
//! model.set_entries(vec![
//!     FileEntry::new("src/lib.rs", true, true, false),
//!     FileEntry::new("notes.txt", false, true, false),
//! ]);
//!
//! let selection = Selection::new();
//! let nodes = selection.selected_nodes(&model);
//! assert_eq!(nodes[0].path, "src");
//! ```

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod event;
pub mod helper;
pub mod keys;
pub mod selection;
pub mod staging;
pub mod task;
pub mod theme;
pub mod tree;
pub mod view;

pub use config::Config;
pub use context::{Context, ContextKey, ContextKind, FocusOpts};
pub use controller::{resolve_binding, Binding, Controller};
pub use error::{CoreError, CoreResult};
pub use event::{ClickPoint, Direction, InputEvent, Message, UiJob, UiQueue, UiSender};
pub use helper::{HelperError, HelperResult};
pub use keys::KeySpec;
pub use selection::Selection;
pub use staging::{apply_staging_action, RefreshGuard, StagingOutcome, WorkingTree};
pub use task::{TaskContext, TaskId, TaskPolicy, TaskRunner, WaitingStatus};
pub use theme::Theme;
pub use tree::{DisplayFilter, FileEntry, FileNode, FileTree, FileTreeViewModel, Row};
pub use view::{TextArea, View, Views};
