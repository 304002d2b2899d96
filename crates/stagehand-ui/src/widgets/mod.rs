//! UI widgets for the stagehand TUI
//!
//! ## Available Widgets
//!
//! - [`StatusBar`] - Bottom line with the waiting label, the latest notice
//!   and key hints
//!
//! ## Example
//!
//! ```ignore
//! use stagehand_ui::widgets::{NoticeKind, StatusBar};
//! use stagehand_core::Theme;
//!
//! let status = StatusBar::new(&theme)
//!     .left("⠋ Pushing")
//!     .center("Pushed", NoticeKind::Info)
//!     .right("space:unstage");
//! ```

pub mod status_bar;

pub use status_bar::{Notice, NoticeKind, StatusBar};
