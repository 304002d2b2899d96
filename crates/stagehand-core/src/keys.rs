//! Key binding notation.
//!
//! Bindings are written as a single character (`d`, `` ` ``) or a named
//! key in angle brackets (`<enter>`, `<space>`, `<backtab>`). Control and
//! alt chords use `<c-x>` and `<a-x>`.

use crate::error::{CoreError, CoreResult};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fmt;
use std::str::FromStr;

/// A parsed key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        KeySpec { code, modifiers }
    }

    /// Parses a binding string.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidKey` for empty strings, unknown names
    /// and malformed chords.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidKey(s.to_string());

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Err(invalid()),
            (Some(c), None) => return Ok(KeySpec::new(KeyCode::Char(c), KeyModifiers::NONE)),
            _ => {}
        }

        let name = s
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(invalid)?;

        if let Some(spec) = parse_chord(name) {
            return Ok(spec);
        }

        let code = match name.to_ascii_lowercase().as_str() {
            "enter" => KeyCode::Enter,
            "space" => KeyCode::Char(' '),
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "esc" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" => KeyCode::PageUp,
            "pgdown" => KeyCode::PageDown,
            other => {
                let n = other
                    .strip_prefix('f')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=12).contains(n))
                    .ok_or_else(invalid)?;
                KeyCode::F(n)
            }
        };
        Ok(KeySpec::new(code, KeyModifiers::NONE))
    }

    /// Returns true if a terminal key press triggers this binding.
    ///
    /// Shift is ignored for characters, since the terminal already
    /// reports the shifted character.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.kind != KeyEventKind::Press || event.code != self.code {
            return false;
        }
        let strip = |m: KeyModifiers| match self.code {
            KeyCode::Char(_) | KeyCode::BackTab => m.difference(KeyModifiers::SHIFT),
            _ => m,
        };
        strip(event.modifiers) == strip(self.modifiers)
    }
}

fn parse_chord(name: &str) -> Option<KeySpec> {
    let (prefix, rest) = name.split_once('-')?;
    let modifiers = match prefix {
        "c" => KeyModifiers::CONTROL,
        "a" => KeyModifiers::ALT,
        _ => return None,
    };
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::new(KeyCode::Char(c), modifiers)),
        _ => None,
    }
}

impl FromStr for KeySpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeySpec::parse(s)
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.modifiers.contains(KeyModifiers::CONTROL) {
            "c-"
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            "a-"
        } else {
            ""
        };
        match self.code {
            KeyCode::Char(' ') => write!(f, "<space>"),
            KeyCode::Char(c) if prefix.is_empty() => write!(f, "{c}"),
            KeyCode::Char(c) => write!(f, "<{prefix}{c}>"),
            KeyCode::Enter => write!(f, "<enter>"),
            KeyCode::Tab => write!(f, "<tab>"),
            KeyCode::BackTab => write!(f, "<backtab>"),
            KeyCode::Esc => write!(f, "<esc>"),
            KeyCode::Backspace => write!(f, "<backspace>"),
            KeyCode::Delete => write!(f, "<delete>"),
            KeyCode::Up => write!(f, "<up>"),
            KeyCode::Down => write!(f, "<down>"),
            KeyCode::Left => write!(f, "<left>"),
            KeyCode::Right => write!(f, "<right>"),
            KeyCode::Home => write!(f, "<home>"),
            KeyCode::End => write!(f, "<end>"),
            KeyCode::PageUp => write!(f, "<pgup>"),
            KeyCode::PageDown => write!(f, "<pgdown>"),
            KeyCode::F(n) => write!(f, "<f{n}>"),
            other => write!(f, "{other:?}"),
        }
    }
}
