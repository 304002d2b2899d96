//! The batch unstage engine and the working-tree seam it drives.
//!
//! A staging action turns a selection into at most two mutation calls:
//! untracked files first, then tracked files and directories. The whole
//! partition-and-mutate step runs under the refresh guard so it never
//! interleaves with a status refresh.

use crate::error::{CoreError, CoreResult};
use crate::tree::{FileEntry, FileNode};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Reads and mutates the repository.
///
/// Implementations are called from worker threads as well as the UI
/// thread, so they must be shareable.
pub trait WorkingTree: Send + Sync {
    /// Current status entries, one per changed path.
    fn load_status(&self) -> CoreResult<Vec<FileEntry>>;

    /// Name of the checked-out branch, if any.
    fn branch_name(&self) -> Option<String> {
        None
    }

    /// Removes tracked paths (and directories) from the index, restoring
    /// them to their HEAD state there.
    fn unstage_tracked_files(&self, paths: &[String]) -> CoreResult<()>;

    /// Removes newly added, untracked paths from the index.
    fn unstage_untracked_files(&self, paths: &[String]) -> CoreResult<()>;

    /// Commits the index with `message`.
    fn commit_staged(&self, message: &str, amend: bool) -> CoreResult<()>;

    /// Pushes the current branch to its upstream.
    fn push(&self) -> CoreResult<()>;

    /// False when there is nowhere to push to.
    fn can_push(&self) -> bool {
        true
    }
}

/// Mutual exclusion between status refreshes and staging actions.
///
/// Refreshes take it blocking; staging actions wait at most the
/// configured timeout and fail with [`CoreError::Busy`] otherwise.
#[derive(Debug, Clone)]
pub struct RefreshGuard {
    lock: Arc<Mutex<()>>,
    timeout: Duration,
}

impl RefreshGuard {
    pub fn new(timeout: Duration) -> Self {
        RefreshGuard {
            lock: Arc::new(Mutex::new(())),
            timeout,
        }
    }

    /// Bounded wait used by staging actions.
    pub fn try_acquire(&self) -> CoreResult<MutexGuard<'_, ()>> {
        self.lock.try_lock_for(self.timeout).ok_or(CoreError::Busy)
    }

    /// Blocking acquire used by the refresh worker.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl Default for RefreshGuard {
    fn default() -> Self {
        RefreshGuard::new(Duration::from_millis(50))
    }
}

/// The paths handed to each mutation, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingOutcome {
    pub untracked: Vec<String>,
    pub tracked: Vec<String>,
}

/// Drops nodes that sit below another selected directory; the directory
/// already covers them.
pub fn normalise_selected_nodes<'a>(nodes: &[&'a FileNode]) -> Vec<&'a FileNode> {
    nodes
        .iter()
        .copied()
        .filter(|node| !nodes.iter().any(|other| other.is_ancestor_of(node)))
        .collect()
}

/// Splits nodes into (tracked or directory, untracked file), keeping
/// their relative order.
pub fn partition_for_unstage<'a>(nodes: &[&'a FileNode]) -> (Vec<&'a FileNode>, Vec<&'a FileNode>) {
    nodes.iter().copied().partition(|n| !n.is_file() || n.tracked)
}

/// Unstages the selected nodes.
///
/// Untracked files go first, then tracked files and directories. The
/// first failing call aborts the action; an earlier successful call is
/// not rolled back.
///
/// # Errors
///
/// * `CoreError::NothingSelected` for an empty selection.
/// * `CoreError::Busy` if a refresh holds the guard past the timeout.
/// * Whatever the working tree returns for a failed mutation.
pub fn apply_staging_action(
    tree: &dyn WorkingTree,
    guard: &RefreshGuard,
    nodes: &[&FileNode],
) -> CoreResult<StagingOutcome> {
    if nodes.is_empty() {
        return Err(CoreError::NothingSelected);
    }

    let _lock = guard.try_acquire()?;

    let nodes = normalise_selected_nodes(nodes);
    let (tracked, untracked) = partition_for_unstage(&nodes);
    let to_paths = |nodes: Vec<&FileNode>| nodes.into_iter().map(|n| n.path.clone()).collect::<Vec<_>>();
    let outcome = StagingOutcome {
        untracked: to_paths(untracked),
        tracked: to_paths(tracked),
    };

    info!(
        untracked = outcome.untracked.len(),
        tracked = outcome.tracked.len(),
        "unstaging files"
    );

    if !outcome.untracked.is_empty() {
        tree.unstage_untracked_files(&outcome.untracked)?;
    }
    if !outcome.tracked.is_empty() {
        tree.unstage_tracked_files(&outcome.tracked)?;
    }

    debug!("unstage finished");
    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every call; can be told to fail one kind of mutation.
    #[derive(Debug, Default)]
    pub struct RecordingTree {
        pub calls: Mutex<Vec<(&'static str, Vec<String>)>>,
        pub fail_tracked: Option<String>,
        pub fail_untracked: Option<String>,
    }

    impl WorkingTree for RecordingTree {
        fn load_status(&self) -> CoreResult<Vec<FileEntry>> {
            Ok(Vec::new())
        }

        fn unstage_tracked_files(&self, paths: &[String]) -> CoreResult<()> {
            self.calls.lock().push(("tracked", paths.to_vec()));
            match &self.fail_tracked {
                Some(msg) => Err(CoreError::Mutation(msg.clone())),
                None => Ok(()),
            }
        }

        fn unstage_untracked_files(&self, paths: &[String]) -> CoreResult<()> {
            self.calls.lock().push(("untracked", paths.to_vec()));
            match &self.fail_untracked {
                Some(msg) => Err(CoreError::Mutation(msg.clone())),
                None => Ok(()),
            }
        }

        fn commit_staged(&self, _message: &str, _amend: bool) -> CoreResult<()> {
            Ok(())
        }

        fn push(&self) -> CoreResult<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingTree;
    use super::*;
    use crate::tree::{DisplayFilter, FileTreeViewModel};
    use proptest::prelude::*;

    fn model(entries: Vec<FileEntry>, show_tree: bool) -> FileTreeViewModel {
        let mut model = FileTreeViewModel::new(show_tree, DisplayFilter::All);
        model.set_entries(entries);
        model
    }

    fn all_nodes(model: &FileTreeViewModel) -> Vec<&FileNode> {
        (0..model.len()).filter_map(|i| model.get(i)).collect()
    }

    #[test]
    fn test_only_tracked_selection_calls_tracked_once() {
        let model = model(
            vec![
                FileEntry::new("a.rs", true, true, false),
                FileEntry::new("b.rs", true, true, false),
            ],
            false,
        );
        let tree = RecordingTree::default();
        let outcome =
            apply_staging_action(&tree, &RefreshGuard::default(), &all_nodes(&model)).expect("ok");

        assert!(outcome.untracked.is_empty());
        let calls = tree.calls.lock();
        assert_eq!(
            *calls,
            vec![("tracked", vec!["a.rs".to_string(), "b.rs".to_string()])]
        );
    }

    #[test]
    fn test_mixed_selection_unstages_untracked_first() {
        let model = model(
            vec![
                FileEntry::new("a.rs", true, true, false),
                FileEntry::new("new.rs", false, true, false),
                FileEntry::new("z.rs", true, true, false),
                FileEntry::new("zz_new.rs", false, true, false),
            ],
            false,
        );
        let tree = RecordingTree::default();
        apply_staging_action(&tree, &RefreshGuard::default(), &all_nodes(&model)).expect("ok");

        let calls = tree.calls.lock();
        assert_eq!(
            *calls,
            vec![
                (
                    "untracked",
                    vec!["new.rs".to_string(), "zz_new.rs".to_string()]
                ),
                ("tracked", vec!["a.rs".to_string(), "z.rs".to_string()]),
            ]
        );
    }

    #[test]
    fn test_directory_goes_to_tracked_group_and_covers_children() {
        let model = model(
            vec![
                FileEntry::new("src/new.rs", false, true, false),
                FileEntry::new("src/lib.rs", true, true, false),
            ],
            true,
        );
        let tree = RecordingTree::default();
        apply_staging_action(&tree, &RefreshGuard::default(), &all_nodes(&model)).expect("ok");

        let calls = tree.calls.lock();
        assert_eq!(*calls, vec![("tracked", vec!["src".to_string()])]);
    }

    #[test]
    fn test_untracked_failure_short_circuits() {
        let model = model(
            vec![
                FileEntry::new("a.rs", true, true, false),
                FileEntry::new("new.rs", false, true, false),
            ],
            false,
        );
        let tree = RecordingTree {
            fail_untracked: Some("index locked".into()),
            ..Default::default()
        };
        let err = apply_staging_action(&tree, &RefreshGuard::default(), &all_nodes(&model))
            .expect_err("must fail");

        assert_eq!(err.to_string(), "index locked");
        assert_eq!(tree.calls.lock().len(), 1);
    }

    #[test]
    fn test_tracked_failure_keeps_untracked_result() {
        let model = model(
            vec![
                FileEntry::new("a.rs", true, true, false),
                FileEntry::new("new.rs", false, true, false),
            ],
            false,
        );
        let tree = RecordingTree {
            fail_tracked: Some("reset failed".into()),
            ..Default::default()
        };
        let err = apply_staging_action(&tree, &RefreshGuard::default(), &all_nodes(&model))
            .expect_err("must fail");

        assert!(matches!(err, CoreError::Mutation(_)));
        let calls = tree.calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "untracked");
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let tree = RecordingTree::default();
        let err = apply_staging_action(&tree, &RefreshGuard::default(), &[]).expect_err("empty");
        assert!(matches!(err, CoreError::NothingSelected));
        assert!(tree.calls.lock().is_empty());
    }

    #[test]
    fn test_busy_when_refresh_holds_guard() {
        let model = model(vec![FileEntry::new("a.rs", true, true, false)], false);
        let guard = RefreshGuard::new(Duration::from_millis(5));
        let _refreshing = guard.lock();

        let tree = RecordingTree::default();
        let err = apply_staging_action(&tree, &guard, &all_nodes(&model)).expect_err("busy");
        assert!(matches!(err, CoreError::Busy));
        assert!(tree.calls.lock().is_empty());
    }

    #[test]
    fn test_guard_released_after_action() {
        let model = model(vec![FileEntry::new("a.rs", true, true, false)], false);
        let guard = RefreshGuard::default();
        let tree = RecordingTree::default();
        apply_staging_action(&tree, &guard, &all_nodes(&model)).expect("ok");
        assert!(!guard.is_locked());
    }

    fn arb_entries() -> impl Strategy<Value = Vec<FileEntry>> {
        proptest::collection::btree_map("[a-c]{1,2}(/[a-c]{1,2}){0,2}", any::<bool>(), 1..12).prop_map(
            |m| {
                m.into_iter()
                    .map(|(path, tracked)| FileEntry::new(path, tracked, true, false))
                    .collect::<Vec<_>>()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_partition_keeps_order_and_classifies(entries in arb_entries(), show_tree in any::<bool>()) {
            let model = model(entries, show_tree);
            let nodes = all_nodes(&model);
            let (a, b) = partition_for_unstage(&nodes);

            prop_assert_eq!(a.len() + b.len(), nodes.len());
            prop_assert!(a.iter().all(|n| !n.is_file() || n.tracked));
            prop_assert!(b.iter().all(|n| n.is_file() && !n.tracked));

            let position = |n: &FileNode| nodes.iter().position(|m| std::ptr::eq(*m, n));
            prop_assert!(a.windows(2).all(|w| position(w[0]) < position(w[1])));
            prop_assert!(b.windows(2).all(|w| position(w[0]) < position(w[1])));
        }

        #[test]
        fn prop_normalised_nodes_have_no_selected_ancestor(entries in arb_entries()) {
            let model = model(entries, true);
            let nodes = all_nodes(&model);
            let normalised = normalise_selected_nodes(&nodes);
            for n in &normalised {
                prop_assert!(!normalised.iter().any(|m| m.is_ancestor_of(n)));
            }
        }
    }
}
