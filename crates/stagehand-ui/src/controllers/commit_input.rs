use stagehand_core::config::{keys, Config};
use stagehand_core::{
    Binding, ClickPoint, Context, ContextKey, ContextKind, Controller, FocusOpts, Message, Views,
};

/// The single-line commit message editor.
///
/// Plain typing is handled by the app's editor; the controller only binds
/// the submit and amend keys.
#[derive(Debug)]
pub struct CommitInputController {
    ctx: Context,
}

impl CommitInputController {
    pub fn new() -> Self {
        CommitInputController {
            ctx: Context::new(
                ContextKey::COMMIT_INPUT,
                ContextKind::Input,
                ContextKey::COMMIT_INPUT.as_str(),
            ),
        }
    }
}

impl Default for CommitInputController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for CommitInputController {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn keybindings(&self, config: &Config) -> Vec<Binding> {
        let u = &config.keybinding.universal;
        let mut bindings = Binding::many(keys([&u.submit_editor_text]), Message::Commit, "commit");
        bindings.extend(Binding::many(
            keys([&u.amend_last_commit]),
            Message::AmendCommit,
            "amend",
        ));
        bindings
    }

    fn on_click(&self, _point: ClickPoint, _focused: bool) -> Option<Message> {
        Some(Message::Focus(ContextKey::COMMIT_INPUT))
    }

    fn on_focus(&mut self, views: &mut Views, _opts: &FocusOpts) {
        views.ensure(self.ctx.view_name).focused = true;
    }

    fn on_focus_lost(&mut self, views: &mut Views) {
        views.ensure(self.ctx.view_name).focused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use stagehand_core::resolve_binding;

    #[test]
    fn test_enter_commits() {
        let bindings = CommitInputController::new().keybindings(&Config::default());
        let hit = resolve_binding(&bindings, &KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(hit.map(|b| &b.message), Some(&Message::Commit));
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn test_ctrl_a_amends() {
        let bindings = CommitInputController::new().keybindings(&Config::default());
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        let plain_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(
            resolve_binding(&bindings, &ctrl_a).map(|b| &b.message),
            Some(&Message::AmendCommit)
        );
        assert!(resolve_binding(&bindings, &plain_a).is_none());
    }

    #[test]
    fn test_click_focuses_input() {
        let c = CommitInputController::new();
        assert_eq!(
            c.on_click(ClickPoint { column: 0, row: 0 }, false),
            Some(Message::Focus(ContextKey::COMMIT_INPUT))
        );
    }
}
