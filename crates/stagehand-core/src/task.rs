//! Background task runner.
//!
//! Slow operations (push, the commit message helper, status refreshes)
//! run on tokio's blocking pool. Each call site allows at most one task
//! at a time; a second request is either rejected or supersedes the
//! first. Results reach the UI only through [`TaskContext::on_ui`].

use crate::error::{CoreError, CoreResult};
use crate::event::UiSender;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Identifier of a started task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// What to do when a task is requested while one is active at the same site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPolicy {
    /// Refuse the new request with `CoreError::TaskBusy`.
    Reject,
    /// Cancel the running task and start the new one. The old task's
    /// pending UI continuations are dropped.
    Supersede,
}

#[derive(Debug)]
struct ActiveTask {
    id: TaskId,
    cancelled: Arc<AtomicBool>,
}

/// The label shown while tasks run. The most recently started task that
/// is still running wins; when it finishes the next newest label shows.
#[derive(Debug, Clone, Default)]
pub struct WaitingStatus {
    active: Arc<Mutex<Vec<(TaskId, String)>>>,
}

impl WaitingStatus {
    pub fn label(&self) -> Option<String> {
        self.active.lock().last().map(|(_, label)| label.clone())
    }

    fn set(&self, id: TaskId, label: String) {
        self.active.lock().push((id, label));
    }

    fn clear(&self, id: TaskId) {
        self.active.lock().retain(|(owner, _)| *owner != id);
    }
}

/// Releases a task's site and label when dropped, so a panicking job
/// still leaves the runner usable.
struct Finish {
    id: TaskId,
    site: &'static str,
    waiting: WaitingStatus,
    active: Arc<Mutex<HashMap<&'static str, ActiveTask>>>,
}

impl Drop for Finish {
    fn drop(&mut self) {
        self.waiting.clear(self.id);
        let mut active = self.active.lock();
        if active.get(self.site).is_some_and(|t| t.id == self.id) {
            active.remove(self.site);
        }
        debug!(site = self.site, id = ?self.id, "background task finished");
    }
}

/// Handed to a running job.
pub struct TaskContext<S> {
    id: TaskId,
    cancelled: Arc<AtomicBool>,
    ui: UiSender<S>,
}

impl<S: 'static> TaskContext<S> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// True once the task has been superseded. Jobs should check this
    /// between steps; nothing interrupts them otherwise.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Schedules `f` on the UI thread. Dropped if the task is cancelled
    /// before the UI gets to it.
    pub fn on_ui<F>(&self, f: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        let cancelled = self.cancelled.clone();
        let id = self.id;
        let posted = self.ui.post(move |state| {
            if cancelled.load(Ordering::Acquire) {
                debug!(?id, "dropping continuation of cancelled task");
                return;
            }
            f(state);
        });
        if posted.is_err() {
            debug!(?id, "ui queue closed, continuation lost");
        }
    }
}

/// Starts labelled jobs on worker threads.
pub struct TaskRunner<S> {
    handle: Handle,
    ui: UiSender<S>,
    waiting: WaitingStatus,
    active: Arc<Mutex<HashMap<&'static str, ActiveTask>>>,
    next_id: AtomicU64,
}

impl<S: 'static> TaskRunner<S> {
    /// Creates a runner that spawns onto `handle` and reports through `ui`.
    pub fn new(handle: Handle, ui: UiSender<S>) -> Self {
        TaskRunner {
            handle,
            ui,
            waiting: WaitingStatus::default(),
            active: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn waiting_status(&self) -> &WaitingStatus {
        &self.waiting
    }

    /// True while a task started at `site` has not finished.
    pub fn is_running(&self, site: &str) -> bool {
        self.active.lock().contains_key(site)
    }

    /// Runs `job` on a worker while showing `label` as the waiting status.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TaskBusy` under [`TaskPolicy::Reject`] when a
    /// task is already running at `site`.
    pub fn run_background<F>(
        &self,
        site: &'static str,
        label: impl Into<String>,
        policy: TaskPolicy,
        job: F,
    ) -> CoreResult<TaskId>
    where
        F: FnOnce(TaskContext<S>) + Send + 'static,
    {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cancelled = Arc::new(AtomicBool::new(false));

        {
            let mut active = self.active.lock();
            if let Some(previous) = active.get(site) {
                match policy {
                    TaskPolicy::Reject => return Err(CoreError::TaskBusy(site.to_string())),
                    TaskPolicy::Supersede => {
                        debug!(site, previous = ?previous.id, "superseding task");
                        previous.cancelled.store(true, Ordering::Release);
                    }
                }
            }
            active.insert(
                site,
                ActiveTask {
                    id,
                    cancelled: cancelled.clone(),
                },
            );
        }

        let label = label.into();
        debug!(site, ?id, %label, "starting background task");
        self.waiting.set(id, label);

        let ctx = TaskContext {
            id,
            cancelled,
            ui: self.ui.clone(),
        };
        let finish = Finish {
            id,
            site,
            waiting: self.waiting.clone(),
            active: self.active.clone(),
        };
        self.handle.spawn_blocking(move || {
            let _finish = finish;
            job(ctx);
        });

        Ok(id)
    }
}

impl<S> std::fmt::Debug for TaskRunner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("waiting", &self.waiting)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::UiQueue;
    use std::sync::mpsc;
    use std::time::Duration;

    fn runner() -> (TaskRunner<Vec<String>>, UiQueue<Vec<String>>) {
        let queue = UiQueue::new();
        let runner = TaskRunner::new(Handle::current(), queue.sender());
        (runner, queue)
    }

    async fn wait_until_idle<S: 'static>(runner: &TaskRunner<S>, site: &str) {
        for _ in 0..200 {
            if !runner.is_running(site) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task at {site} did not finish");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_continuation_runs_on_drain() {
        let (runner, mut queue) = runner();
        runner
            .run_background("push", "Pushing", TaskPolicy::Reject, |ctx| {
                ctx.on_ui(|log: &mut Vec<String>| log.push("pushed".into()));
            })
            .expect("started");

        let job = queue.next().await.expect("continuation");
        let mut log = Vec::new();
        job(&mut log);
        assert_eq!(log, vec!["pushed".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reject_policy_refuses_second_task() {
        let (runner, _queue) = runner();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        runner
            .run_background("push", "Pushing", TaskPolicy::Reject, move |_| {
                let _ = release_rx.recv();
            })
            .expect("first starts");

        let err = runner
            .run_background("push", "Pushing", TaskPolicy::Reject, |_| {})
            .expect_err("second rejected");
        assert!(matches!(err, CoreError::TaskBusy(site) if site == "push"));

        release_tx.send(()).expect("release");
        wait_until_idle(&runner, "push").await;
        assert!(runner
            .run_background("push", "Pushing", TaskPolicy::Reject, |_| {})
            .is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_supersede_cancels_and_drops_old_continuations() {
        let (runner, mut queue) = runner();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (seen_tx, seen_rx) = mpsc::channel::<bool>();

        runner
            .run_background("generate", "AI", TaskPolicy::Supersede, move |ctx| {
                let _ = release_rx.recv();
                let _ = seen_tx.send(ctx.is_cancelled());
                ctx.on_ui(|log: &mut Vec<String>| log.push("old".into()));
            })
            .expect("first starts");

        runner
            .run_background("generate", "AI", TaskPolicy::Supersede, |ctx| {
                ctx.on_ui(|log: &mut Vec<String>| log.push("new".into()));
            })
            .expect("supersede never blocks");

        release_tx.send(()).expect("release");
        assert!(seen_rx.recv().expect("first task reports"));
        wait_until_idle(&runner, "generate").await;

        let mut log = Vec::new();
        queue.drain(&mut log);
        assert_eq!(log, vec!["new".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_waiting_status_follows_latest_task() {
        let (runner, _queue) = runner();
        let (release_a_tx, release_a_rx) = mpsc::channel::<()>();
        let (release_b_tx, release_b_rx) = mpsc::channel::<()>();

        runner
            .run_background("a", "first", TaskPolicy::Reject, move |_| {
                let _ = release_a_rx.recv();
            })
            .expect("a starts");
        runner
            .run_background("b", "second", TaskPolicy::Reject, move |_| {
                let _ = release_b_rx.recv();
            })
            .expect("b starts");
        assert_eq!(runner.waiting_status().label().as_deref(), Some("second"));

        release_a_tx.send(()).expect("release a");
        wait_until_idle(&runner, "a").await;
        assert_eq!(runner.waiting_status().label().as_deref(), Some("second"));

        release_b_tx.send(()).expect("release b");
        wait_until_idle(&runner, "b").await;
        assert_eq!(runner.waiting_status().label(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_earlier_label_returns_when_later_task_ends() {
        let (runner, _queue) = runner();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        runner
            .run_background("generate", "AI", TaskPolicy::Supersede, move |_| {
                let _ = release_rx.recv();
            })
            .expect("generate starts");
        runner
            .run_background("refresh", "Refreshing", TaskPolicy::Supersede, |_| {})
            .expect("refresh starts");
        wait_until_idle(&runner, "refresh").await;

        assert!(runner.is_running("generate"));
        assert_eq!(runner.waiting_status().label().as_deref(), Some("AI"));

        release_tx.send(()).expect("release");
        wait_until_idle(&runner, "generate").await;
        assert_eq!(runner.waiting_status().label(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_job_frees_its_site() {
        let (runner, _queue) = runner();
        runner
            .run_background("push", "Pushing", TaskPolicy::Reject, |_| {
                panic!("push exploded");
            })
            .expect("first starts");
        wait_until_idle(&runner, "push").await;

        assert_eq!(runner.waiting_status().label(), None);
        assert!(runner
            .run_background("push", "Pushing", TaskPolicy::Reject, |_| {})
            .is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sites_are_independent() {
        let (runner, _queue) = runner();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        runner
            .run_background("push", "Pushing", TaskPolicy::Reject, move |_| {
                let _ = release_rx.recv();
            })
            .expect("push starts");
        assert!(runner
            .run_background("refresh", "Refreshing", TaskPolicy::Reject, |_| {})
            .is_ok());
        release_tx.send(()).expect("release");
    }
}
