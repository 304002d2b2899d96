//! # stagehand-ui
//!
//! Focus routing, controllers and rendering for the stagehand TUI.
//!
//! This crate builds the staging panel on top of [`stagehand_core`]:
//!
//! - [`App`] - Owns the UI state and turns messages into actions
//! - [`FocusRouter`] - Focus stack with on-focus and on-focus-lost hooks
//! - [`NavigationGrid`] - Literal neighbours of every panel
//! - [`HitTest`] - Clicks on the inline action token of a file row
//! - [`StagingLayout`] - Screen areas of the file list, commit row and status bar
//! - [`StatusBar`] - Waiting status, notices and key hints
//!
//! ## Focus
//!
//! Every context registers a [`stagehand_core::Controller`] with the
//! router. Pushing a context blurs the old one, runs the new one's focus
//! hook and puts it on top of the stack:
//!
//! ```
//! use stagehand_core::{ContextKey, FocusOpts, Views};
//! use stagehand_ui::controllers::{CommitInputController, StagedFilesController};
//! use stagehand_ui::FocusRouter;
//!
//! let mut views = Views::new();
//! let mut router = FocusRouter::new();
//! router.register(Box::new(StagedFilesController::new()));
//! router.register(Box::new(CommitInputController::new()));
//!
//! router.push(&mut views, ContextKey::STAGED_FILES, FocusOpts::default()).unwrap();
//! router.push(&mut views, ContextKey::COMMIT_INPUT, FocusOpts::default()).unwrap();
//! assert_eq!(router.current(), Some(ContextKey::COMMIT_INPUT));
//! assert!(views.get("commitInput").unwrap().focused);
//! assert!(!views.get("stagedFiles").unwrap().focused);
//! ```

pub mod app;
pub mod controllers;
pub mod focus;
pub mod navigation;
pub mod presentation;
pub mod renderer;
pub mod widgets;

pub use app::App;
pub use focus::FocusRouter;
pub use hit_test::HitTest;
pub use navigation::NavigationGrid;
pub use renderer::StagingLayout;
pub use widgets::{Notice, NoticeKind, StatusBar};
