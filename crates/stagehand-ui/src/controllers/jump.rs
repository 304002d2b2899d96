use stagehand_core::config::{keys, Config};
use stagehand_core::{Binding, ContextKey, Message};
use tracing::warn;

/// Side windows reachable with the jump keys, in key order.
pub const SIDE_WINDOWS: [ContextKey; 2] = [ContextKey::STAGED_FILES, ContextKey::COMMIT_INPUT];

/// One global binding per configured jump key.
///
/// Extra keys beyond the window count are ignored.
pub fn jump_bindings(config: &Config) -> Vec<Binding> {
    let configured = &config.keybinding.universal.jump_to_block;
    if configured.len() != SIDE_WINDOWS.len() {
        warn!(
            keys = configured.len(),
            windows = SIDE_WINDOWS.len(),
            "jump_to_block key count does not match side window count"
        );
    }
    keys(configured)
        .into_iter()
        .take(SIDE_WINDOWS.len())
        .enumerate()
        .map(|(index, key)| Binding::new(key, Message::JumpToBlock(index), "jump"))
        .collect()
}
