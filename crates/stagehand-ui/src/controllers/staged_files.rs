use stagehand_core::config::{keys, Config};
use stagehand_core::{
    Binding, ClickPoint, Context, ContextKey, ContextKind, Controller, FocusOpts, Message, Views,
};

/// The staged-files tree panel.
#[derive(Debug)]
pub struct StagedFilesController {
    ctx: Context,
}

impl StagedFilesController {
    pub fn new() -> Self {
        StagedFilesController {
            ctx: Context::new(
                ContextKey::STAGED_FILES,
                ContextKind::Side,
                ContextKey::STAGED_FILES.as_str(),
            ),
        }
    }
}

impl Default for StagedFilesController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for StagedFilesController {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn keybindings(&self, config: &Config) -> Vec<Binding> {
        let u = &config.keybinding.universal;
        let f = &config.keybinding.files;
        let groups = [
            (vec![&u.prev_item, &u.prev_item_alt], Message::CursorUp, "up"),
            (vec![&u.next_item, &u.next_item_alt], Message::CursorDown, "down"),
            (vec![&u.select], Message::Select, "unstage"),
            (vec![&u.remove], Message::Remove, "unstage"),
            (vec![&u.go_into], Message::GoInto, "open dir"),
            (vec![&u.toggle_range_select], Message::ToggleRangeSelect, "range"),
            (vec![&u.toggle_pick], Message::TogglePick, "pick"),
            (vec![&f.toggle_tree_view], Message::ToggleTreeView, "tree/flat"),
            (vec![&f.collapse_all], Message::CollapseAll, "collapse all"),
            (vec![&f.expand_all], Message::ExpandAll, "expand all"),
        ];
        groups
            .into_iter()
            .flat_map(|(bound, message, description)| {
                Binding::many(keys(bound), message, description)
            })
            .collect()
    }

    fn on_click(&self, point: ClickPoint, focused: bool) -> Option<Message> {
        // An unfocused panel only takes focus; the token is live once focused.
        focused.then_some(Message::ActionButtonClick(point))
    }

    fn on_focus(&mut self, views: &mut Views, opts: &FocusOpts) {
        let view = views.ensure(self.ctx.view_name);
        view.focused = true;
        if let Some(line) = opts.clicked_line {
            let height = view.area.height.saturating_sub(2) as usize;
            view.focus_line(line, height);
        }
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

    fn message_for(code: KeyCode) -> Option<Message> {
        let bindings = StagedFilesController::new().keybindings(&Config::default());
        resolve_binding(&bindings, &KeyEvent::new(code, KeyModifiers::NONE)).map(|b| b.message.clone())
    }

    #[test]
    fn test_default_bindings() {
        assert_eq!(message_for(KeyCode::Char(' ')), Some(Message::Select));
        assert_eq!(message_for(KeyCode::Char('d')), Some(Message::Remove));
        assert_eq!(message_for(KeyCode::Enter), Some(Message::GoInto));
        assert_eq!(message_for(KeyCode::Char('j')), Some(Message::CursorDown));
        assert_eq!(message_for(KeyCode::Up), Some(Message::CursorUp));
        assert_eq!(message_for(KeyCode::Char('v')), Some(Message::ToggleRangeSelect));
        assert_eq!(message_for(KeyCode::Char('`')), Some(Message::ToggleTreeView));
        assert_eq!(message_for(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_click_only_acts_when_focused() {
        let c = StagedFilesController::new();
        let point = ClickPoint { column: 4, row: 1 };
        assert_eq!(c.on_click(point, false), None);
        assert_eq!(c.on_click(point, true), Some(Message::ActionButtonClick(point)));
    }

    #[test]
    fn test_focus_hooks_toggle_view_focus() {
        let mut c = StagedFilesController::new();
        let mut views = Views::new();
        c.on_focus(&mut views, &FocusOpts::default());
        assert!(views.get("stagedFiles").is_some_and(|v| v.focused));
        c.on_focus_lost(&mut views);
        assert!(views.get("stagedFiles").is_some_and(|v| !v.focused));
    }
}
