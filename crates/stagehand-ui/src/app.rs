//! Main application struct
//!
//! The [`App`] owns all UI state: the focus router, the views, the file
//! tree snapshot and the selection. It turns terminal input into
//! [`Message`]s and carries them out. Slow work goes through the
//! [`TaskRunner`], whose continuations come back through the UI queue.
//!
//! # Example
//!
//! ```ignore
//! use stagehand_ui::App;
//! use stagehand_core::{Message, UiQueue};
//!
//! let mut queue = UiQueue::new();
//! let mut app = App::new(config, repo, repo_path, handle, queue.sender())?;
//! app.request_refresh();
//!
//! loop {
//!     queue.drain(&mut app);
//!     terminal.draw(|f| app.render(f))?;
//!     if event::poll(tick)? {
//!         app.dispatch(Message::from(InputEvent::from(event::read()?)));
//!     }
//!     if app.should_quit() {
//!         break;
//!     }
//! }
//! ```

use crate::controllers::{
    jump_bindings, ButtonController, CommitInputController, StagedFilesController, SIDE_WINDOWS,
};
use crate::focus::FocusRouter;
use crate::hit_test::{self, HitTest};
use crate::navigation::{NavigationGrid, NavigationKeys};
use crate::presentation;
use crate::renderer::{self, StagingLayout};
use crate::widgets::status_bar::SPINNER;
use crate::widgets::{Notice, StatusBar};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use stagehand_core::config::keys;
use stagehand_core::helper;
use stagehand_core::{
    apply_staging_action, resolve_binding, Binding, ClickPoint, Config, ContextKey, ContextKind,
    CoreError, CoreResult, Direction, DisplayFilter, FileEntry, FileTreeViewModel, FocusOpts,
    KeySpec, Message, RefreshGuard, Selection, TaskPolicy, TaskRunner, Theme, UiSender, Views,
    WorkingTree,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Waiting label while the helper runs.
pub const GENERATE_LABEL: &str = "AI: generating commit message";
const PUSH_LABEL: &str = "Pushing";
const COMMIT_LABEL: &str = "Committing";
const REFRESH_LABEL: &str = "Refreshing files";

const REFRESH_SITE: &str = "refresh";
const PUSH_SITE: &str = "push";
const COMMIT_SITE: &str = "commit";
const GENERATE_SITE: &str = "generate";

/// Main application state
///
/// Lives on the UI thread. Workers never see it directly; they post
/// closures through the [`UiSender`] handed to [`App::new`].
pub struct App {
    config: Config,
    theme: Theme,
    router: FocusRouter,
    grid: NavigationGrid,
    nav_keys: NavigationKeys,
    /// Bindings per context, resolved from the config once
    bindings: HashMap<ContextKey, Vec<Binding>>,
    global_bindings: Vec<Binding>,
    views: Views,
    model: FileTreeViewModel,
    selection: Selection,
    repo: Arc<dyn WorkingTree>,
    repo_path: PathBuf,
    branch: Option<String>,
    guard: RefreshGuard,
    runner: TaskRunner<App>,
    notice: Option<Notice>,
    spinner: usize,
    should_quit: bool,
}

impl App {
    /// Builds the app with every context registered and the file panel
    /// focused. The file list stays empty until the first refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the navigation graph names a context that is
    /// not registered.
    pub fn new(
        config: Config,
        repo: Arc<dyn WorkingTree>,
        repo_path: PathBuf,
        handle: Handle,
        ui: UiSender<App>,
    ) -> CoreResult<Self> {
        let mut views = Views::new();
        let mut router = FocusRouter::new();

        router.register(Box::new(StagedFilesController::new()));
        router.register(Box::new(CommitInputController::new()));
        for button in [
            ButtonController::generate(),
            ButtonController::commit(),
            ButtonController::push(),
        ] {
            button.init_view(&mut views);
            router.register(Box::new(button));
        }

        let grid = NavigationGrid::standard();
        grid.validate(&router)?;

        let bindings = router
            .keys()
            .filter_map(|key| router.controller(key).map(|c| (key, c.keybindings(&config))))
            .collect();

        let u = &config.keybinding.universal;
        let mut global_bindings = Binding::many(keys([&u.quit]), Message::Quit, "quit");
        global_bindings.push(Binding::new(
            KeySpec::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Message::Quit,
            "quit",
        ));
        global_bindings.extend(Binding::many(keys([&u.refresh]), Message::Refresh, "refresh"));
        global_bindings.extend(jump_bindings(&config));

        let mut app = App {
            theme: config.theme(),
            nav_keys: NavigationKeys::from_config(&config),
            model: FileTreeViewModel::new(config.gui.show_file_tree, DisplayFilter::Staged),
            guard: RefreshGuard::new(config.guard_timeout()),
            runner: TaskRunner::new(handle, ui),
            config,
            router,
            grid,
            bindings,
            global_bindings,
            views,
            selection: Selection::new(),
            repo,
            repo_path,
            branch: None,
            notice: None,
            spinner: 0,
            should_quit: false,
        };
        app.router
            .push(&mut app.views, ContextKey::STAGED_FILES, FocusOpts::default())?;
        app.sync_views();
        Ok(app)
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The focused context.
    pub fn focused(&self) -> Option<ContextKey> {
        self.router.current()
    }

    pub fn model(&self) -> &FileTreeViewModel {
        &self.model
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn guard(&self) -> &RefreshGuard {
        &self.guard
    }

    /// Label of the running background task, if any.
    pub fn waiting_label(&self) -> Option<String> {
        self.runner.waiting_status().label()
    }

    /// Text in the commit message editor.
    pub fn commit_message(&self) -> &str {
        self.views
            .get(ContextKey::COMMIT_INPUT.as_str())
            .map(|v| v.text_area.text())
            .unwrap_or_default()
    }

    /// Handles one message, reporting any error in the status bar.
    pub fn dispatch(&mut self, msg: Message) {
        for msg in msg.flatten() {
            if let Err(err) = self.handle(msg) {
                self.report(err);
            }
        }
        self.sync_views();
    }

    fn handle(&mut self, msg: Message) -> CoreResult<()> {
        match msg {
            Message::Focus(key) => self.push_context(key, FocusOpts::default()),
            Message::Navigate(direction) => self.navigate(direction),
            Message::JumpToBlock(index) => self.jump_to_block(index),
            Message::CursorUp => {
                self.selection.move_up();
                Ok(())
            }
            Message::CursorDown => {
                self.selection.move_down(self.model.len());
                Ok(())
            }
            Message::Select => self.handle_select(),
            Message::Remove => self.press(),
            Message::GoInto => {
                self.enter();
                Ok(())
            }
            Message::ToggleTreeView => {
                self.model.toggle_show_tree();
                self.selection.retain_existing(&self.model);
                Ok(())
            }
            Message::CollapseAll => {
                self.model.collapse_all();
                self.selection.retain_existing(&self.model);
                Ok(())
            }
            Message::ExpandAll => {
                self.model.expand_all();
                self.selection.retain_existing(&self.model);
                Ok(())
            }
            Message::ToggleRangeSelect => {
                self.selection.toggle_range();
                Ok(())
            }
            Message::TogglePick => {
                let path = self
                    .selection
                    .current(&self.model)
                    .map(|n| n.path.clone())
                    .ok_or(CoreError::NothingSelected)?;
                self.selection.toggle_pick(&path);
                Ok(())
            }
            Message::ActionButtonClick(point) => self.handle_action_click(point),
            Message::Commit => self.commit(false),
            Message::AmendCommit => self.commit(true),
            Message::PushRemote => self.push_remote(),
            Message::GenerateCommitMessage => self.generate_commit_message(),
            Message::Refresh => {
                self.request_refresh();
                Ok(())
            }
            Message::Quit => {
                self.should_quit = true;
                Ok(())
            }
            Message::Key(key) => self.handle_key(key),
            Message::Mouse(mouse) => self.handle_mouse(mouse),
            Message::Paste(text) => {
                self.handle_paste(&text);
                Ok(())
            }
            Message::Resize(..) | Message::Batch(_) | Message::None => Ok(()),
        }
    }

    /// Shows an error: user mistakes inline, everything else as a toast.
    fn report(&mut self, err: CoreError) {
        if err.is_user_error() {
            debug!(%err, "user error");
            self.notice = Some(Notice::warning(err.to_string()));
        } else {
            warn!(%err, "action failed");
            self.notice = Some(Notice::error(err.to_string()));
        }
    }

    // === Input ===

    fn handle_key(&mut self, key: KeyEvent) -> CoreResult<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let Some(focused) = self.router.current_controller().map(|c| *c.context()) else {
            return Ok(());
        };

        let bound = self
            .bindings
            .get(&focused.key)
            .and_then(|b| resolve_binding(b, &key))
            .map(|b| b.message.clone());
        if let Some(message) = bound {
            return self.handle(message);
        }

        if focused.kind == ContextKind::Input && self.edit_input(&key) {
            return Ok(());
        }

        if let Some(direction) = self.nav_keys.direction(&key) {
            return self.navigate(direction);
        }

        if let Some(message) = resolve_binding(&self.global_bindings, &key).map(|b| b.message.clone()) {
            return self.handle(message);
        }
        Ok(())
    }

    /// Applies an editing key to the commit message. Returns false for
    /// keys the editor does not use.
    fn edit_input(&mut self, key: &KeyEvent) -> bool {
        let text_area = &mut self.views.ensure(ContextKey::COMMIT_INPUT.as_str()).text_area;
        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                text_area.type_char(c)
            }
            KeyCode::Backspace => text_area.backspace(),
            KeyCode::Delete => text_area.delete(),
            KeyCode::Left => text_area.move_left(),
            KeyCode::Right => text_area.move_right(),
            KeyCode::Home => text_area.move_home(),
            KeyCode::End => text_area.move_end(),
            _ => return false,
        }
        true
    }

    /// Pasted text goes into the commit message, never submits it.
    fn handle_paste(&mut self, text: &str) {
        if self.router.current() == Some(ContextKey::COMMIT_INPUT) {
            self.views
                .ensure(ContextKey::COMMIT_INPUT.as_str())
                .text_area
                .type_str(text);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> CoreResult<()> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {}
            MouseEventKind::ScrollDown if self.over_files(&mouse) => {
                self.selection.move_down(self.model.len());
                return Ok(());
            }
            MouseEventKind::ScrollUp if self.over_files(&mouse) => {
                self.selection.move_up();
                return Ok(());
            }
            _ => return Ok(()),
        }

        let Some(view) = self.views.view_at(mouse.column, mouse.row) else {
            return Ok(());
        };
        let Some((column, row)) = view.content_position(mouse.column, mouse.row) else {
            return Ok(());
        };
        let name = view.name;
        let line = view.row_to_line(row);

        let router = &self.router;
        let Some(key) = router
            .keys()
            .find(|&k| router.controller(k).is_some_and(|c| c.context().view_name == name))
        else {
            return Ok(());
        };
        let focused = self.router.current() == Some(key);
        let point = ClickPoint { column, row };
        let message = self
            .router
            .controller(key)
            .and_then(|c| c.on_click(point, focused));

        match message {
            Some(message) => self.handle(message),
            None => self.focus_clicked(key, line),
        }
    }

    fn over_files(&self, mouse: &MouseEvent) -> bool {
        self.views
            .get(ContextKey::STAGED_FILES.as_str())
            .is_some_and(|v| v.contains(mouse.column, mouse.row))
    }

    /// Plain click: focus the context and, for the file list, select the
    /// clicked line.
    fn focus_clicked(&mut self, key: ContextKey, line: usize) -> CoreResult<()> {
        if key == ContextKey::STAGED_FILES && line < self.model.len() {
            self.selection.select_single(line, self.model.len());
        }
        self.push_context(key, FocusOpts::clicked(line))
    }

    /// Click on the focused file list. A hit on a row's token presses that
    /// row, as does a second click on the row under the cursor.
    fn handle_action_click(&mut self, point: ClickPoint) -> CoreResult<()> {
        let Some(view) = self.views.get(ContextKey::STAGED_FILES.as_str()) else {
            return Ok(());
        };
        let line = view.row_to_line(point.row);

        match hit_test::resolve_click(view, &self.model, point) {
            HitTest::Hit(row) => {
                self.selection.select_single(row, self.model.len());
                self.router
                    .handle_focus(&mut self.views, ContextKey::STAGED_FILES, FocusOpts::default())?;
                self.press()
            }
            HitTest::NotHandled
                if line == self.selection.cursor()
                    && !self.selection.is_range()
                    && self.selection.picked().is_empty()
                    && line < self.model.len() =>
            {
                self.press()
            }
            HitTest::NotHandled => self.focus_clicked(ContextKey::STAGED_FILES, line),
        }
    }

    // === Focus ===

    fn push_context(&mut self, key: ContextKey, opts: FocusOpts) -> CoreResult<()> {
        self.router.push(&mut self.views, key, opts)
    }

    fn navigate(&mut self, direction: Direction) -> CoreResult<()> {
        let Some(from) = self.router.current() else {
            return Ok(());
        };
        match self.grid.resolve(from, direction) {
            Some(to) => self.push_context(to, FocusOpts::default()),
            None => Ok(()),
        }
    }

    fn jump_to_block(&mut self, index: usize) -> CoreResult<()> {
        let Some(&key) = SIDE_WINDOWS.get(index) else {
            warn!(index, "no side window for jump key");
            return Ok(());
        };
        self.router.replace(&mut self.views, key, FocusOpts::default())
    }

    // === File panel ===

    /// The select key: toggles a lone selected directory, otherwise
    /// unstages the selection.
    fn handle_select(&mut self) -> CoreResult<()> {
        let nodes = self.selection.selected_nodes(&self.model);
        match nodes.as_slice() {
            [] => Err(CoreError::NothingSelected),
            [node] if node.is_dir() => {
                let path = node.path.clone();
                self.model.toggle_collapsed(&path);
                self.selection.retain_existing(&self.model);
                Ok(())
            }
            _ => self.press(),
        }
    }

    /// Unstages the selection, then refreshes and re-focuses the panel.
    fn press(&mut self) -> CoreResult<()> {
        let result = {
            let nodes = self.selection.selected_nodes(&self.model);
            apply_staging_action(self.repo.as_ref(), &self.guard, &nodes)
        };

        match result {
            Ok(outcome) => {
                debug!(?outcome, "unstaged selection");
                self.selection.collapse_to_cursor();
                self.request_refresh();
                self.router
                    .handle_focus(&mut self.views, ContextKey::STAGED_FILES, FocusOpts::default())
            }
            Err(err @ CoreError::Mutation(_)) => {
                // The untracked half may have gone through already.
                self.request_refresh();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Toggles the directory under the cursor; files are left alone.
    fn enter(&mut self) {
        let Some(path) = self
            .selection
            .current(&self.model)
            .filter(|n| n.is_dir())
            .map(|n| n.path.clone())
        else {
            return;
        };
        self.model.toggle_collapsed(&path);
        self.selection.retain_existing(&self.model);
    }

    // === Commit panel ===

    /// Checks the message on the UI thread, then commits (or amends HEAD)
    /// in the background. The input is cleared once the commit lands.
    fn commit(&mut self, amend: bool) -> CoreResult<()> {
        self.push_context(ContextKey::COMMIT_INPUT, FocusOpts::default())?;

        let message = self.commit_message().trim().to_string();
        if message.is_empty() {
            return Err(CoreError::EmptyCommitMessage);
        }
        // Amending may only reword the last commit.
        if !amend && !self.model.entries().iter().any(|e| e.has_staged) {
            return Err(CoreError::NoStagedFiles);
        }

        let repo = Arc::clone(&self.repo);
        self.runner
            .run_background(COMMIT_SITE, COMMIT_LABEL, TaskPolicy::Reject, move |ctx| {
                let result = repo.commit_staged(&message, amend);
                ctx.on_ui(move |app: &mut App| match result {
                    Ok(()) => {
                        info!(amend, "committed staged changes");
                        app.views
                            .ensure(ContextKey::COMMIT_INPUT.as_str())
                            .text_area
                            .clear();
                        app.notice = Some(Notice::info(if amend { "Amended" } else { "Committed" }));
                        app.request_refresh();
                        app.sync_views();
                    }
                    Err(err) => app.report(err),
                });
            })?;
        Ok(())
    }

    fn push_remote(&mut self) -> CoreResult<()> {
        if !self.repo.can_push() {
            return Err(CoreError::PushUnavailable);
        }
        let repo = Arc::clone(&self.repo);
        self.runner
            .run_background(PUSH_SITE, PUSH_LABEL, TaskPolicy::Reject, move |ctx| {
                let result = repo.push();
                ctx.on_ui(move |app: &mut App| match result {
                    Ok(()) => {
                        app.notice = Some(Notice::info("Pushed"));
                        app.request_refresh();
                    }
                    Err(err) => app.report(err),
                });
            })?;
        Ok(())
    }

    /// Focuses the input and asks the helper for a message in the
    /// background. A newer request supersedes an older one.
    fn generate_commit_message(&mut self) -> CoreResult<()> {
        self.push_context(ContextKey::COMMIT_INPUT, FocusOpts::default())?;

        let binary = self.config.helper.binary.clone();
        let max_len = self.config.helper.max_message_len;
        let repo_path = self.repo_path.clone();
        self.runner
            .run_background(GENERATE_SITE, GENERATE_LABEL, TaskPolicy::Supersede, move |ctx| {
                let result = helper::generate_commit_message(&binary, &repo_path, max_len);
                if ctx.is_cancelled() {
                    return;
                }
                ctx.on_ui(move |app: &mut App| match result {
                    Ok(message) => app.fill_commit_message(&message),
                    Err(err) => {
                        warn!(%err, "commit message helper failed");
                        app.notice = Some(Notice::error(format!("AI: {err}")));
                    }
                });
            })?;
        Ok(())
    }

    fn fill_commit_message(&mut self, message: &str) {
        let text_area = &mut self.views.ensure(ContextKey::COMMIT_INPUT.as_str()).text_area;
        text_area.clear();
        text_area.type_str(message);
        if let Err(err) = self.push_context(ContextKey::COMMIT_INPUT, FocusOpts::default()) {
            self.report(err);
        }
        self.sync_views();
    }

    // === Refresh ===

    /// Schedules a status reload on a worker. The result replaces the
    /// tree snapshot on the UI thread.
    pub fn request_refresh(&mut self) {
        let repo = Arc::clone(&self.repo);
        let guard = self.guard.clone();
        let started = self
            .runner
            .run_background(REFRESH_SITE, REFRESH_LABEL, TaskPolicy::Supersede, move |ctx| {
                let result = {
                    let _lock = guard.lock();
                    repo.load_status()
                };
                let branch = repo.branch_name();
                ctx.on_ui(move |app: &mut App| match result {
                    Ok(entries) => app.apply_status(entries, branch),
                    Err(err) => app.report(err),
                });
            });
        if let Err(err) = started {
            self.report(err);
        }
    }

    fn apply_status(&mut self, entries: Vec<FileEntry>, branch: Option<String>) {
        debug!(count = entries.len(), "applying status snapshot");
        self.model.set_entries(entries);
        self.selection.retain_existing(&self.model);
        self.branch = branch;
        self.sync_views();
    }

    // === Rendering ===

    /// Copies model state into the views so rendering and hit testing
    /// see the same lines.
    fn sync_views(&mut self) {
        let files = self.views.ensure(ContextKey::STAGED_FILES.as_str());
        files.lines = presentation::render_lines(&self.model);
        files.title = presentation::files_title(self.branch.as_deref(), self.model.show_tree());

        let input = self.views.ensure(ContextKey::COMMIT_INPUT.as_str());
        input.title = " Commit message ".to_string();
        input.lines = vec![input.text_area.text().to_string()];
    }

    /// Key hints for the focused context.
    fn key_hints(&self) -> String {
        let Some(bindings) = self.router.current().and_then(|k| self.bindings.get(&k)) else {
            return String::new();
        };
        let mut seen = Vec::new();
        bindings
            .iter()
            .filter(|b| {
                let fresh = !seen.contains(&b.description);
                seen.push(b.description);
                fresh
            })
            .map(|b| format!("{}:{}", b.key, b.description))
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// Renders the entire application.
    pub fn render(&mut self, frame: &mut Frame) {
        self.sync_views();
        self.spinner = (self.spinner + 1) % SPINNER.len();

        let label = |key: ContextKey, views: &Views| {
            views
                .get(key.as_str())
                .and_then(|v| v.lines.first().cloned())
                .unwrap_or_default()
        };
        let labels = [
            label(ContextKey::COMMIT_GENERATE_BUTTON, &self.views),
            label(ContextKey::COMMIT_BUTTON, &self.views),
            label(ContextKey::COMMIT_PUSH_BUTTON, &self.views),
        ];
        let layout = StagingLayout::new(
            frame.area(),
            [labels[0].as_str(), labels[1].as_str(), labels[2].as_str()],
        );

        let selected: Vec<usize> = self
            .selection
            .selected_nodes(&self.model)
            .into_iter()
            .filter_map(|n| self.model.row_of(&n.path))
            .collect();
        let cursor = (!self.model.is_empty()).then_some(self.selection.cursor());

        let panels = [
            (ContextKey::STAGED_FILES, layout.files),
            (ContextKey::COMMIT_INPUT, layout.input),
            (ContextKey::COMMIT_GENERATE_BUTTON, layout.generate),
            (ContextKey::COMMIT_BUTTON, layout.commit),
            (ContextKey::COMMIT_PUSH_BUTTON, layout.push),
        ];
        for (key, area) in panels {
            let view = self.views.ensure(key.as_str());
            if area.is_empty() {
                view.area = area;
                continue;
            }
            if key == ContextKey::STAGED_FILES {
                renderer::draw_list(frame, area, view, &self.theme, cursor, &selected);
            } else if key == ContextKey::COMMIT_INPUT {
                renderer::draw_input(frame, area, view, &self.theme);
            } else {
                renderer::draw_button(frame, area, view, &self.theme);
            }
        }

        let waiting = self
            .waiting_label()
            .map(|label| format!("{} {label}", SPINNER[self.spinner]))
            .unwrap_or_default();
        let hints = self.key_hints();
        let (notice, kind) = self
            .notice
            .as_ref()
            .map(|n| (n.text.as_str(), n.kind))
            .unwrap_or(("", crate::widgets::NoticeKind::Info));
        let status = StatusBar::new(&self.theme)
            .left(&waiting)
            .center(notice, kind)
            .right(&hints);
        frame.render_widget(status, layout.status_bar);
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("router", &self.router)
            .field("repo_path", &self.repo_path)
            .field("rows", &self.model.len())
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}
