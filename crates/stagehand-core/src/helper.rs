//! External commit message helper.
//!
//! The helper is a separate executable invoked as
//! `<helper> llm commit-msg --repo <repo>` with the repository as its
//! working directory. Its stdout is the suggested message.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum HelperError {
    /// Neither next to the running executable nor on `PATH`.
    #[error("{0} not found (expected `{0}` next to stagehand or in PATH)")]
    NotFound(String),

    /// The helper exited non-zero and wrote to stderr.
    #[error("{binary} llm commit-msg failed: {stderr}")]
    Failed { binary: String, stderr: String },

    /// The helper exited non-zero without saying why.
    #[error("{binary} exited with {status}")]
    Exit { binary: String, status: String },

    #[error("failed to run helper: {0}")]
    Spawn(#[source] std::io::Error),

    /// Nothing was left after sanitising the output.
    #[error("empty commit message")]
    EmptyMessage,
}

pub type HelperResult<T> = Result<T, HelperError>;

/// Finds the helper: first next to the current executable, then on `PATH`.
pub fn resolve_helper(binary: &str) -> HelperResult<PathBuf> {
    if let Some(dir) = env::current_exe().ok().as_deref().and_then(Path::parent) {
        let candidate = dir.join(binary);
        if is_executable_file(&candidate) {
            return Ok(candidate);
        }
    }

    which(binary).ok_or_else(|| HelperError::NotFound(binary.to_string()))
}

/// First `PATH` entry containing an executable named `binary`.
pub fn which(binary: &str) -> Option<PathBuf> {
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths).find_map(|dir| {
            let full_path = dir.join(binary);
            is_executable_file(&full_path).then_some(full_path)
        })
    })
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// Runs the helper for `repo` and returns its trimmed stdout.
///
/// # Errors
///
/// Returns `HelperError::Failed` with the trimmed stderr on a non-zero
/// exit, or `HelperError::Exit` if stderr was empty.
pub fn run_commit_msg(helper: &Path, repo: &Path) -> HelperResult<String> {
    let binary = helper
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| helper.display().to_string());

    debug!(helper = %helper.display(), repo = %repo.display(), "running commit message helper");
    let output = Command::new(helper)
        .args(["llm", "commit-msg", "--repo"])
        .arg(repo)
        .current_dir(repo)
        .output()
        .map_err(HelperError::Spawn)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(if stderr.is_empty() {
            HelperError::Exit {
                binary,
                status: output.status.to_string(),
            }
        } else {
            HelperError::Failed { binary, stderr }
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Flattens a message onto one line and cuts it to `max_len` characters.
///
/// Each `\r` and `\n` becomes a single space, then the result is trimmed
/// and truncated. Truncation counts characters, so a multi-byte
/// character is never split.
pub fn sanitize_commit_message(message: &str, max_len: usize) -> String {
    let flat: String = message
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    flat.trim().chars().take(max_len).collect()
}

/// Resolves the helper, runs it and sanitises the result.
///
/// # Errors
///
/// Any resolution or process failure, or `HelperError::EmptyMessage`
/// when the sanitised message is empty.
pub fn generate_commit_message(binary: &str, repo: &Path, max_len: usize) -> HelperResult<String> {
    let helper = resolve_helper(binary)?;
    let raw = run_commit_msg(&helper, repo)?;
    let message = sanitize_commit_message(&raw, max_len);
    if message.is_empty() {
        return Err(HelperError::EmptyMessage);
    }
    info!(len = message.chars().count(), "generated commit message");
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_flattens_and_truncates() {
        let input = format!("Fix bug\r\nin parser{}", "x".repeat(250));
        let out = sanitize_commit_message(&input, 200);
        assert_eq!(out.chars().count(), 200);
        assert!(out.starts_with("Fix bug  in parser"));
        assert!(!out.contains('\n'));
        assert!(!out.contains('\r'));
    }

    #[test]
    fn test_sanitize_line_breaks_only_is_empty() {
        assert_eq!(sanitize_commit_message("\r\n", 200), "");
    }

    #[test]
    fn test_sanitize_counts_characters() {
        let out = sanitize_commit_message(&"é".repeat(300), 200);
        assert_eq!(out.chars().count(), 200);
    }

    #[test]
    fn test_sanitize_trims_after_flattening() {
        assert_eq!(sanitize_commit_message("\n  feat: add x \r", 200), "feat: add x");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            HelperError::NotFound("zeemux".into()).to_string(),
            "zeemux not found (expected `zeemux` next to stagehand or in PATH)"
        );
        let failed = HelperError::Failed {
            binary: "zeemux".into(),
            stderr: "no API key".into(),
        };
        assert_eq!(failed.to_string(), "zeemux llm commit-msg failed: no API key");
    }

    #[test]
    fn test_resolve_unknown_helper_fails() {
        let err = resolve_helper("stagehand-test-helper-that-does-not-exist").expect_err("missing");
        assert!(matches!(err, HelperError::NotFound(_)));
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("fake-helper");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
            let mut perms = fs::metadata(&path).expect("metadata").permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).expect("chmod");
            path
        }

        #[test]
        fn test_run_passes_protocol_arguments() {
            let dir = TempDir::new().expect("tempdir");
            let helper = script(&dir, "echo \"$1 $2 $3 $(basename \"$4\")\"");
            let repo = TempDir::new().expect("repo dir");
            let out = run_commit_msg(&helper, repo.path()).expect("helper runs");
            let repo_name = repo
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            assert_eq!(out, format!("llm commit-msg --repo {repo_name}"));
        }

        #[test]
        fn test_run_prefers_stderr_on_failure() {
            let dir = TempDir::new().expect("tempdir");
            let helper = script(&dir, "echo '  rate limited  ' >&2\nexit 3");
            let err = run_commit_msg(&helper, dir.path()).expect_err("non-zero exit");
            assert!(
                matches!(&err, HelperError::Failed { stderr, .. } if stderr == "rate limited"),
                "unexpected error: {err}"
            );
        }

        #[test]
        fn test_run_without_stderr_reports_exit() {
            let dir = TempDir::new().expect("tempdir");
            let helper = script(&dir, "exit 1");
            let err = run_commit_msg(&helper, dir.path()).expect_err("non-zero exit");
            assert!(matches!(err, HelperError::Exit { .. }));
        }

        #[test]
        fn test_non_executable_file_is_skipped() {
            let dir = TempDir::new().expect("tempdir");
            let path = dir.path().join("plain");
            fs::write(&path, "data").expect("write");
            assert!(!is_executable_file(&path));
            assert!(!is_executable_file(dir.path()));
        }
    }

    proptest! {
        #[test]
        fn prop_sanitized_is_single_bounded_line(s in ".{0,400}", max in 1usize..300) {
            let out = sanitize_commit_message(&s, max);
            prop_assert!(out.chars().count() <= max);
            prop_assert!(!out.contains('\n') && !out.contains('\r'));
        }
    }
}
