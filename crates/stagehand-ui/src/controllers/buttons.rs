//! The commit panel's buttons: commit, push and generate.
//!
//! A button shows `[ Label ]` and switches to `[*Label*]` while focused.

use stagehand_core::config::{keys, Config};
use stagehand_core::{
    Binding, ClickPoint, Context, ContextKey, ContextKind, Controller, FocusOpts, Message, Views,
};

#[derive(Debug)]
pub struct ButtonController {
    ctx: Context,
    label: &'static str,
    message: Message,
    description: &'static str,
}

impl ButtonController {
    fn new(key: ContextKey, label: &'static str, message: Message, description: &'static str) -> Self {
        ButtonController {
            ctx: Context::new(key, ContextKind::Button, key.as_str()),
            label,
            message,
            description,
        }
    }

    /// `[ Commit ]`: commits the message in the input.
    pub fn commit() -> Self {
        Self::new(ContextKey::COMMIT_BUTTON, "Commit", Message::Commit, "commit")
    }

    /// `[ Push ]`: pushes the current branch in the background.
    pub fn push() -> Self {
        Self::new(ContextKey::COMMIT_PUSH_BUTTON, "Push", Message::PushRemote, "push")
    }

    /// `[ AI ]`: asks the helper for a commit message.
    pub fn generate() -> Self {
        Self::new(
            ContextKey::COMMIT_GENERATE_BUTTON,
            "AI",
            Message::GenerateCommitMessage,
            "generate message",
        )
    }

    pub fn label(&self, focused: bool) -> String {
        if focused {
            format!("[*{}*]", self.label)
        } else {
            format!("[ {} ]", self.label)
        }
    }

    /// Writes the unfocused label into the button's view.
    pub fn init_view(&self, views: &mut Views) {
        self.set_label(views, false);
    }

    fn set_label(&self, views: &mut Views, focused: bool) {
        let view = views.ensure(self.ctx.view_name);
        view.lines = vec![self.label(focused)];
        view.focused = focused;
    }
}

impl Controller for ButtonController {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn keybindings(&self, config: &Config) -> Vec<Binding> {
        let u = &config.keybinding.universal;
        Binding::many(
            keys([&u.submit_editor_text, &u.select]),
            self.message.clone(),
            self.description,
        )
    }

    fn on_click(&self, _point: ClickPoint, _focused: bool) -> Option<Message> {
        Some(self.message.clone())
    }

    fn on_focus(&mut self, views: &mut Views, _opts: &FocusOpts) {
        self.set_label(views, true);
    }

    fn on_focus_lost(&mut self, views: &mut Views) {
        self.set_label(views, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use stagehand_core::resolve_binding;

    fn line(views: &Views, name: &str) -> Option<String> {
        views.get(name).and_then(|v| v.lines.first().cloned())
    }

    #[test]
    fn test_labels_follow_focus() {
        let mut button = ButtonController::commit();
        let mut views = Views::new();
        button.init_view(&mut views);
        assert_eq!(line(&views, "commitButton").as_deref(), Some("[ Commit ]"));

        button.on_focus(&mut views, &FocusOpts::default());
        assert_eq!(line(&views, "commitButton").as_deref(), Some("[*Commit*]"));

        button.on_focus_lost(&mut views);
        assert_eq!(line(&views, "commitButton").as_deref(), Some("[ Commit ]"));
    }

    #[test]
    fn test_enter_and_space_press_the_button() {
        let button = ButtonController::push();
        let bindings = button.keybindings(&Config::default());
        for code in [KeyCode::Enter, KeyCode::Char(' ')] {
            let hit = resolve_binding(&bindings, &KeyEvent::new(code, KeyModifiers::NONE));
            assert_eq!(hit.map(|b| &b.message), Some(&Message::PushRemote));
        }
    }

    #[test]
    fn test_click_sends_button_message() {
        let point = ClickPoint { column: 1, row: 0 };
        assert_eq!(ButtonController::commit().on_click(point, false), Some(Message::Commit));
        assert_eq!(
            ButtonController::generate().on_click(point, true),
            Some(Message::GenerateCommitMessage)
        );
        assert_eq!(ButtonController::generate().label(false), "[ AI ]");
    }
}
