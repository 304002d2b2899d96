//! stagehand-git - git2-backed working tree for stagehand
//!
//! [`GitRepo`] implements [`stagehand_core::WorkingTree`]: status
//! snapshots, unstaging tracked and untracked paths, committing the
//! index and pushing.
//!
//! # Example
//!
//! ```no_run
//! use stagehand_core::WorkingTree;
//! use stagehand_git::GitRepo;
//! use std::path::Path;
//!
//! let repo = GitRepo::open(Path::new(".")).expect("inside a repository");
//! let entries = repo.load_status().expect("status");
//! println!("{} changed paths", entries.len());
//! ```

pub mod error;
pub mod repo;

pub use error::{GitError, GitResult};
pub use repo::GitRepo;
