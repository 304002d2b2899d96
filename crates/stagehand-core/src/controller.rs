//! Controller trait: the behaviour attached to a context.
//!
//! A controller has a fixed set of capabilities: key bindings, a click
//! handler and focus hooks. It does not execute actions itself; bindings
//! resolve to [`Message`]s that the application carries out.

use crate::config::Config;
use crate::context::{Context, FocusOpts};
use crate::event::{ClickPoint, Message};
use crate::keys::KeySpec;
use crate::view::Views;
use crossterm::event::KeyEvent;

/// A key bound to a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub key: KeySpec,
    pub message: Message,
    /// Short label for the key hints in the status bar.
    pub description: &'static str,
}

impl Binding {
    pub fn new(key: KeySpec, message: Message, description: &'static str) -> Self {
        Binding {
            key,
            message,
            description,
        }
    }

    /// One binding per key, all sending the same message.
    pub fn many(
        keys: impl IntoIterator<Item = KeySpec>,
        message: Message,
        description: &'static str,
    ) -> Vec<Binding> {
        keys.into_iter()
            .map(|key| Binding::new(key, message.clone(), description))
            .collect()
    }
}

/// Finds the first binding triggered by `event`.
pub fn resolve_binding<'a>(bindings: &'a [Binding], event: &KeyEvent) -> Option<&'a Binding> {
    bindings.iter().find(|b| b.key.matches(event))
}

/// Behaviour of one context.
///
/// Controllers live on the UI thread, so there is no `Send` bound.
pub trait Controller {
    /// The context this controller drives.
    fn context(&self) -> &Context;

    /// Key bindings active while the context is focused.
    fn keybindings(&self, _config: &Config) -> Vec<Binding> {
        Vec::new()
    }

    /// Message for a left click inside the view, or `None` to let the
    /// click fall through to plain focus-and-select.
    fn on_click(&self, _point: ClickPoint, _focused: bool) -> Option<Message> {
        None
    }

    /// Called after the context is pushed onto the focus stack.
    fn on_focus(&mut self, _views: &mut Views, _opts: &FocusOpts) {}

    /// Called before another context is pushed over this one.
    fn on_focus_lost(&mut self, _views: &mut Views) {}
}
