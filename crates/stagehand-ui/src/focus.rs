//! Focus management for the TUI
//!
//! The [`FocusRouter`] owns every registered [`Controller`] and a stack of
//! focused contexts. The top of the stack receives key input. Focus hooks
//! run only from here, exactly once per transition.
//!
//! # Example
//!
//! ```ignore
//! use stagehand_ui::FocusRouter;
//! use stagehand_core::{ContextKey, FocusOpts, Views};
//!
//! let mut router = FocusRouter::new();
//! router.register(Box::new(my_controller));
//! router.push(&mut views, ContextKey::STAGED_FILES, FocusOpts::default())?;
//! ```

use stagehand_core::{ContextKey, Controller, CoreError, CoreResult, FocusOpts, Views};
use std::collections::HashMap;
use tracing::debug;

/// Registry of controllers plus the focus stack.
///
/// FocusRouter handles:
/// - Registering controllers by context key
/// - Pushing and replacing the focused context
/// - Running the focus and focus-lost hooks
///
/// Not thread-safe; it lives on the UI thread with the rest of the app.
#[derive(Default)]
pub struct FocusRouter {
    /// Focused contexts, most recent last
    stack: Vec<ContextKey>,
    controllers: HashMap<ContextKey, Box<dyn Controller>>,
}

impl FocusRouter {
    /// Creates a router with no controllers.
    ///
    /// # Example
    ///
    /// ```
    /// use stagehand_ui::FocusRouter;
    ///
    /// let router = FocusRouter::new();
    /// assert!(router.current().is_none());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under its context key, replacing any
    /// previous controller for that key.
    pub fn register(&mut self, controller: Box<dyn Controller>) {
        let key = controller.context().key;
        debug!(%key, "registering context");
        self.controllers.insert(key, controller);
    }

    /// Returns the controller for `key`.
    pub fn controller(&self, key: ContextKey) -> Option<&dyn Controller> {
        self.controllers.get(&key).map(|c| c.as_ref())
    }

    /// Returns the controller of the focused context.
    pub fn current_controller(&self) -> Option<&dyn Controller> {
        self.current().and_then(|key| self.controller(key))
    }

    /// Keys of every registered context.
    pub fn keys(&self) -> impl Iterator<Item = ContextKey> + '_ {
        self.controllers.keys().copied()
    }

    /// True if `key` is registered and can take focus.
    pub fn is_focusable(&self, key: ContextKey) -> bool {
        self.controllers
            .get(&key)
            .is_some_and(|c| c.context().focusable)
    }

    /// The focused context, if any.
    #[must_use]
    pub fn current(&self) -> Option<ContextKey> {
        self.stack.last().copied()
    }

    /// The whole focus stack, bottom first.
    pub fn stack(&self) -> &[ContextKey] {
        &self.stack
    }

    /// Focuses `key`.
    ///
    /// Does nothing if `key` is already focused. Otherwise the current
    /// context's focus-lost hook runs, then `key` goes on top and its
    /// focus hook runs with `opts`. If `key` is already further down the
    /// stack, everything above it is dropped first.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ContextNotFound` for an unregistered key and
    /// `CoreError::NotFocusable` for a context that cannot take focus.
    /// The stack is unchanged in both cases.
    pub fn push(&mut self, views: &mut Views, key: ContextKey, opts: FocusOpts) -> CoreResult<()> {
        if self.current() == Some(key) {
            return Ok(());
        }
        self.check_focusable(key)?;

        self.blur_current(views);
        if let Some(pos) = self.stack.iter().position(|k| *k == key) {
            self.stack.truncate(pos);
        }
        self.activate(views, key, opts);
        Ok(())
    }

    /// Like [`push`](Self::push), but `key` takes the place of the current
    /// top instead of going above it.
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    pub fn replace(
        &mut self,
        views: &mut Views,
        key: ContextKey,
        opts: FocusOpts,
    ) -> CoreResult<()> {
        if self.current() == Some(key) {
            return Ok(());
        }
        self.check_focusable(key)?;

        self.blur_current(views);
        self.stack.pop();
        if let Some(pos) = self.stack.iter().position(|k| *k == key) {
            self.stack.truncate(pos);
        }
        self.activate(views, key, opts);
        Ok(())
    }

    /// Re-runs the focus hook of `key` without touching the stack.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ContextNotFound` for an unregistered key.
    pub fn handle_focus(
        &mut self,
        views: &mut Views,
        key: ContextKey,
        opts: FocusOpts,
    ) -> CoreResult<()> {
        let controller = self
            .controllers
            .get_mut(&key)
            .ok_or_else(|| CoreError::ContextNotFound(key.to_string()))?;
        controller.on_focus(views, &opts);
        Ok(())
    }

    fn check_focusable(&self, key: ContextKey) -> CoreResult<()> {
        match self.controllers.get(&key) {
            None => Err(CoreError::ContextNotFound(key.to_string())),
            Some(c) if !c.context().focusable => Err(CoreError::NotFocusable(key.to_string())),
            Some(_) => Ok(()),
        }
    }

    fn blur_current(&mut self, views: &mut Views) {
        if let Some(top) = self.current() {
            if let Some(controller) = self.controllers.get_mut(&top) {
                controller.on_focus_lost(views);
            }
        }
    }

    fn activate(&mut self, views: &mut Views, key: ContextKey, opts: FocusOpts) {
        debug!(%key, depth = self.stack.len() + 1, "focus");
        self.stack.push(key);
        if let Some(controller) = self.controllers.get_mut(&key) {
            controller.on_focus(views, &opts);
        }
    }
}

impl std::fmt::Debug for FocusRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusRouter")
            .field("stack", &self.stack)
            .field("registered", &self.controllers.len())
            .finish()
    }
}
