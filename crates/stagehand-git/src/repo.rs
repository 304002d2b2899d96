//! Git repository operations
//!
//! Wraps a git2 [`Repository`] and exposes the operations the staging
//! panel needs. The repository handle sits behind a mutex so the wrapper
//! can be shared with worker threads.

use crate::error::{GitError, GitResult};
use git2::{Repository, Status, StatusOptions};
use parking_lot::Mutex;
use stagehand_core::{CoreResult, FileEntry, WorkingTree};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

const INDEX_CHANGES: Status = Status::INDEX_NEW
    .union(Status::INDEX_MODIFIED)
    .union(Status::INDEX_DELETED)
    .union(Status::INDEX_RENAMED)
    .union(Status::INDEX_TYPECHANGE);

const WORKTREE_CHANGES: Status = Status::WT_NEW
    .union(Status::WT_MODIFIED)
    .union(Status::WT_DELETED)
    .union(Status::WT_RENAMED)
    .union(Status::WT_TYPECHANGE);

/// Git repository wrapper
pub struct GitRepo {
    repo: Mutex<Repository>,
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo").field("root", &self.root).finish()
    }
}

impl GitRepo {
    /// Open a Git repository from the given path
    ///
    /// Discovers the repository by searching upward from the path.
    pub fn open(path: &Path) -> GitResult<Self> {
        let repo = Repository::discover(path).map_err(|_| GitError::NotARepository)?;
        let root = repo
            .workdir()
            .ok_or_else(|| GitError::Git(git2::Error::from_str("bare repository")))?
            .to_path_buf();

        Ok(GitRepo {
            repo: Mutex::new(repo),
            root,
        })
    }

    /// Check if a path is within a Git repository
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    /// Get the repository root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the current branch name
    pub fn current_branch(&self) -> GitResult<String> {
        let repo = self.repo.lock();
        let head = repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            // Detached HEAD - show short commit hash
            let commit = head.peel_to_commit()?;
            Ok(format!("{:.7}", commit.id()))
        }
    }

    /// One entry per changed path, with index and worktree flags.
    ///
    /// Newly added files count as untracked until they are committed.
    pub fn status_entries(&self) -> GitResult<Vec<FileEntry>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.include_ignored(false);
        opts.recurse_untracked_dirs(true);

        let repo = self.repo.lock();
        let statuses = repo.statuses(Some(&mut opts))?;
        let entries = statuses
            .iter()
            .filter_map(|entry| {
                let status = entry.status();
                let path = entry.path()?.to_string();
                Some(FileEntry {
                    path,
                    tracked: !status.intersects(Status::WT_NEW | Status::INDEX_NEW),
                    has_staged: status.intersects(INDEX_CHANGES),
                    has_unstaged: status.intersects(WORKTREE_CHANGES | Status::CONFLICTED),
                })
            })
            .collect();
        Ok(entries)
    }

    /// Resets tracked paths (files or directories) in the index to HEAD.
    pub fn unstage_tracked(&self, paths: &[String]) -> GitResult<()> {
        let repo = self.repo.lock();
        match repo.head().and_then(|h| h.peel_to_commit()) {
            Ok(head) => {
                repo.reset_default(Some(head.as_object()), paths.iter().map(String::as_str))?;
            }
            Err(_) => {
                // No HEAD commit yet: everything staged is new.
                let mut index = repo.index()?;
                for path in paths {
                    let path = Path::new(path);
                    if index.get_path(path, 0).is_some() {
                        index.remove_path(path)?;
                    } else {
                        index.remove_dir(path, 0)?;
                    }
                }
                index.write()?;
            }
        }
        debug!(count = paths.len(), "reset tracked paths");
        Ok(())
    }

    /// Drops newly added files from the index, leaving the worktree alone.
    pub fn unstage_untracked(&self, paths: &[String]) -> GitResult<()> {
        let repo = self.repo.lock();
        let mut index = repo.index()?;
        for path in paths {
            index.remove_path(Path::new(path))?;
        }
        index.write()?;
        debug!(count = paths.len(), "removed untracked paths from index");
        Ok(())
    }

    /// Commits the current index.
    pub fn commit(&self, message: &str, amend: bool) -> GitResult<()> {
        let repo = self.repo.lock();
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let head = repo.head().and_then(|h| h.peel_to_commit()).ok();

        let id = if amend {
            let head = head.ok_or(GitError::NoHead)?;
            head.amend(Some("HEAD"), None, None, None, Some(message), Some(&tree))?
        } else {
            let signature = repo.signature()?;
            let parents: Vec<&git2::Commit<'_>> = head.iter().collect();
            repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?
        };

        info!(commit = %id, amend, "created commit");
        Ok(())
    }

    /// True if at least one remote is configured.
    pub fn has_remote(&self) -> bool {
        self.repo
            .lock()
            .remotes()
            .map(|remotes| !remotes.is_empty())
            .unwrap_or(false)
    }

    /// Runs `git push` for the current branch.
    pub fn push_current(&self) -> GitResult<()> {
        info!(root = %self.root.display(), "pushing");
        let output = Command::new("git")
            .arg("push")
            .current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::Push(if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            }));
        }
        Ok(())
    }
}

impl WorkingTree for GitRepo {
    fn load_status(&self) -> CoreResult<Vec<FileEntry>> {
        Ok(self.status_entries()?)
    }

    fn branch_name(&self) -> Option<String> {
        self.current_branch().ok()
    }

    fn unstage_tracked_files(&self, paths: &[String]) -> CoreResult<()> {
        Ok(self.unstage_tracked(paths)?)
    }

    fn unstage_untracked_files(&self, paths: &[String]) -> CoreResult<()> {
        Ok(self.unstage_untracked(paths)?)
    }

    fn commit_staged(&self, message: &str, amend: bool) -> CoreResult<()> {
        Ok(self.commit(message, amend)?)
    }

    fn push(&self) -> CoreResult<()> {
        Ok(self.push_current()?)
    }

    fn can_push(&self) -> bool {
        self.has_remote()
    }
}
