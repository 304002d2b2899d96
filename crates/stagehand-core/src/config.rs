//! User configuration.
//!
//! Loaded from `<config dir>/stagehand/config.toml`. Every field has a
//! default, so a missing file or a partial file is fine.

use crate::error::{CoreError, CoreResult};
use crate::keys::KeySpec;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the commit message helper binary looked up by default.
pub const DEFAULT_HELPER_BINARY: &str = "zeemux";

/// Commit messages produced by the helper are cut to this many characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 200;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub keybinding: KeybindingConfig,
    pub gui: GuiConfig,
    pub helper: HelperConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeybindingConfig {
    pub universal: UniversalKeys,
    pub files: FileKeys,
}

/// Keys that apply across panels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UniversalKeys {
    pub quit: String,
    pub refresh: String,
    pub select: String,
    pub remove: String,
    pub go_into: String,
    pub submit_editor_text: String,
    /// Amends the last commit with the message in the commit input.
    pub amend_last_commit: String,
    pub prev_item: String,
    pub prev_item_alt: String,
    pub next_item: String,
    pub next_item_alt: String,
    pub prev_block: String,
    pub next_block: String,
    pub prev_block_alt: String,
    pub next_block_alt: String,
    pub prev_block_alt2: String,
    pub next_block_alt2: String,
    pub toggle_range_select: String,
    pub toggle_pick: String,
    /// One key per side window, in window order.
    pub jump_to_block: Vec<String>,
}

impl Default for UniversalKeys {
    fn default() -> Self {
        UniversalKeys {
            quit: "q".into(),
            refresh: "R".into(),
            select: "<space>".into(),
            remove: "d".into(),
            go_into: "<enter>".into(),
            submit_editor_text: "<enter>".into(),
            amend_last_commit: "<c-a>".into(),
            prev_item: "<up>".into(),
            prev_item_alt: "k".into(),
            next_item: "<down>".into(),
            next_item_alt: "j".into(),
            prev_block: "<left>".into(),
            next_block: "<right>".into(),
            prev_block_alt: "h".into(),
            next_block_alt: "l".into(),
            prev_block_alt2: "<backtab>".into(),
            next_block_alt2: "<tab>".into(),
            toggle_range_select: "v".into(),
            toggle_pick: "m".into(),
            jump_to_block: vec!["1".into(), "2".into()],
        }
    }
}

/// Keys specific to the file tree panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileKeys {
    pub toggle_tree_view: String,
    pub collapse_all: String,
    pub expand_all: String,
}

impl Default for FileKeys {
    fn default() -> Self {
        FileKeys {
            toggle_tree_view: "`".into(),
            collapse_all: "-".into(),
            expand_all: "=".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuiConfig {
    /// Show files as a tree rather than a flat list.
    pub show_file_tree: bool,
    /// `dark` or `light`.
    pub theme: String,
}

impl Default for GuiConfig {
    fn default() -> Self {
        GuiConfig {
            show_file_tree: true,
            theme: "dark".into(),
        }
    }
}

/// Commit message helper settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HelperConfig {
    pub binary: String,
    pub max_message_len: usize,
}

impl Default for HelperConfig {
    fn default() -> Self {
        HelperConfig {
            binary: DEFAULT_HELPER_BINARY.into(),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RefreshConfig {
    /// How long a staging action waits for an in-flight refresh.
    pub guard_timeout_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            guard_timeout_ms: 50,
        }
    }
}

impl Config {
    /// Loads the config from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if it contains an invalid key binding.
    pub fn load() -> CoreResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the config from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load_from(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            tracing::debug!(?path, "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|source| CoreError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location.
    pub fn config_path() -> CoreResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            CoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "failed to find config directory",
            ))
        })?;
        Ok(config_dir.join("stagehand").join("config.toml"))
    }

    /// Checks that every key binding parses.
    pub fn validate(&self) -> CoreResult<()> {
        let u = &self.keybinding.universal;
        let f = &self.keybinding.files;
        let singles = [
            &u.quit,
            &u.refresh,
            &u.select,
            &u.remove,
            &u.go_into,
            &u.submit_editor_text,
            &u.amend_last_commit,
            &u.prev_item,
            &u.prev_item_alt,
            &u.next_item,
            &u.next_item_alt,
            &u.prev_block,
            &u.next_block,
            &u.prev_block_alt,
            &u.next_block_alt,
            &u.prev_block_alt2,
            &u.next_block_alt2,
            &u.toggle_range_select,
            &u.toggle_pick,
            &f.toggle_tree_view,
            &f.collapse_all,
            &f.expand_all,
        ];
        for key in singles.into_iter().chain(u.jump_to_block.iter()) {
            KeySpec::parse(key)?;
        }
        Ok(())
    }

    pub fn guard_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh.guard_timeout_ms)
    }

    /// Theme named by `gui.theme`; unknown names fall back to dark.
    pub fn theme(&self) -> Theme {
        Theme::by_name(&self.gui.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.gui.theme, "unknown theme, using dark");
            Theme::dark()
        })
    }
}

/// Parses a binding string, or a list of them, into key specs.
///
/// Invalid strings are skipped; [`Config::validate`] reports them at load.
pub fn keys<'a>(bindings: impl IntoIterator<Item = &'a String>) -> Vec<KeySpec> {
    bindings
        .into_iter()
        .filter_map(|s| KeySpec::parse(s).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.keybinding.universal.select, "<space>");
        assert_eq!(config.keybinding.universal.remove, "d");
        assert_eq!(config.keybinding.files.toggle_tree_view, "`");
        assert_eq!(config.helper.binary, "zeemux");
        assert_eq!(config.helper.max_message_len, 200);
        assert!(config.gui.show_file_tree);
        assert_eq!(config.guard_timeout(), Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [keybinding.universal]
            remove = "u"

            [gui]
            show_file_tree = false
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.keybinding.universal.remove, "u");
        assert_eq!(config.keybinding.universal.select, "<space>");
        assert!(!config.gui.show_file_tree);
        assert_eq!(config.gui.theme, "dark");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_rejects_invalid_key() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "[keybinding.files]\ncollapse_all = \"<bogus>\"").expect("write");
        let err = Config::load_from(file.path()).expect_err("invalid key must fail");
        assert!(matches!(err, CoreError::InvalidKey(k) if k == "<bogus>"));
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "[gui\nshow_file_tree = true").expect("write");
        let err = Config::load_from(file.path()).expect_err("malformed toml must fail");
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[test]
    fn test_theme_lookup() {
        let mut config = Config::default();
        config.gui.theme = "light".into();
        assert_eq!(config.theme().name, "Light");
        config.gui.theme = "neon".into();
        assert_eq!(config.theme().name, "Dark");
    }

    #[test]
    fn test_keys_helper_skips_invalid() {
        let bindings = vec!["<enter>".to_string(), "<nope>".to_string(), "j".to_string()];
        assert_eq!(keys(&bindings).len(), 2);
    }
}
