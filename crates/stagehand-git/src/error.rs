//! Error types for the stagehand-git crate

use stagehand_core::CoreError;
use thiserror::Error;

/// Git-specific errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Not inside a Git repository
    #[error("not a git repository")]
    NotARepository,

    /// Git operation failed
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// IO operation failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `git push` exited non-zero; holds its trimmed stderr
    #[error("push failed: {0}")]
    Push(String),

    /// No HEAD commit found
    #[error("no HEAD commit")]
    NoHead,
}

/// Result type alias for Git operations
pub type GitResult<T> = Result<T, GitError>;

impl From<GitError> for CoreError {
    fn from(err: GitError) -> Self {
        CoreError::Mutation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_error_becomes_verbatim_mutation() {
        let core: CoreError = GitError::Push("rejected (non-fast-forward)".into()).into();
        assert_eq!(core.to_string(), "push failed: rejected (non-fast-forward)");
    }
}
