//! Contexts: the addressable regions of the UI that can own input.
//!
//! Every context is registered once at startup and lives for the whole
//! session. A context is identified by a stable [`ContextKey`] and
//! renders into exactly one named view.

use std::fmt;

/// Stable identifier for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey(&'static str);

impl ContextKey {
    /// The staged-files tree panel.
    pub const STAGED_FILES: ContextKey = ContextKey("stagedFiles");
    /// The single-line commit message editor.
    pub const COMMIT_INPUT: ContextKey = ContextKey("commitInput");
    /// The `[ Commit ]` button.
    pub const COMMIT_BUTTON: ContextKey = ContextKey("commitButton");
    /// The `[ Push ]` button.
    pub const COMMIT_PUSH_BUTTON: ContextKey = ContextKey("commitPushButton");
    /// The `[ AI ]` commit message generator button.
    pub const COMMIT_GENERATE_BUTTON: ContextKey = ContextKey("commitGenerateButton");

    /// Creates a key from a static name.
    pub const fn new(name: &'static str) -> Self {
        ContextKey(name)
    }

    /// Returns the key's name.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Broad category of a context, used for layout and input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// A list panel in the side column.
    Side,
    /// A single-line clickable button.
    Button,
    /// A text editor.
    Input,
}

/// Static description of a registered context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub key: ContextKey,
    pub kind: ContextKind,
    /// Name of the view this context renders into.
    pub view_name: &'static str,
    pub focusable: bool,
}

impl Context {
    /// Creates a focusable context.
    pub const fn new(key: ContextKey, kind: ContextKind, view_name: &'static str) -> Self {
        Context {
            key,
            kind,
            view_name,
            focusable: true,
        }
    }

    /// Marks the context as unable to receive focus.
    pub const fn unfocusable(mut self) -> Self {
        self.focusable = false;
        self
    }
}

/// Options passed to a context's on-focus hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusOpts {
    /// View line that was clicked to give this context focus, if any.
    pub clicked_line: Option<usize>,
}

impl FocusOpts {
    /// Focus caused by a click on the given view line.
    pub fn clicked(line: usize) -> Self {
        FocusOpts {
            clicked_line: Some(line),
        }
    }
}
