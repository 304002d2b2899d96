//! Color themes.
//!
//! A theme is picked by name from the config (`gui.theme`).

use ratatui::style::{Color, Modifier, Style};

/// Complete theme definition
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme display name
    pub name: String,
    pub colors: ThemeColors,
}

/// Color palette for the theme
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub background: Color,
    pub foreground: Color,
    /// Border of the focused panel.
    pub accent: Color,
    /// Cursor row and status bar background.
    pub selection: Color,
    pub error: Color,
    /// Waiting status spinner.
    pub warning: Color,
    /// Staged changes.
    pub success: Color,
    /// Unfocused borders, hints and unstaged changes.
    pub muted: Color,
}

impl Theme {
    /// Creates the default dark theme
    pub fn dark() -> Self {
        Theme {
            name: "Dark".to_string(),
            colors: ThemeColors {
                background: Color::Rgb(30, 30, 46),
                foreground: Color::Rgb(205, 214, 244),
                accent: Color::Rgb(137, 180, 250),
                selection: Color::Rgb(88, 91, 112),
                error: Color::Rgb(243, 139, 168),
                warning: Color::Rgb(249, 226, 175),
                success: Color::Rgb(166, 227, 161),
                muted: Color::Rgb(147, 153, 178),
            },
        }
    }

    /// Creates a light theme
    pub fn light() -> Self {
        Theme {
            name: "Light".to_string(),
            colors: ThemeColors {
                background: Color::Rgb(239, 241, 245),
                foreground: Color::Rgb(76, 79, 105),
                accent: Color::Rgb(30, 102, 245),
                selection: Color::Rgb(188, 192, 204),
                error: Color::Rgb(210, 15, 57),
                warning: Color::Rgb(223, 142, 29),
                success: Color::Rgb(64, 160, 43),
                muted: Color::Rgb(108, 111, 133),
            },
        }
    }

    /// Looks a theme up by case-insensitive name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::dark()),
            "light" => Some(Theme::light()),
            _ => None,
        }
    }

    /// Border style for a panel.
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.colors.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.colors.muted)
        }
    }

    /// Style of the cursor row in a list.
    pub fn cursor_row(&self) -> Style {
        Style::default()
            .bg(self.colors.selection)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::dark()
    }
}
