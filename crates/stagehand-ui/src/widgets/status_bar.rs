//! Status bar widget for displaying application state
//!
//! The [`StatusBar`] widget renders a three-section bar at the bottom
//! of the terminal: the running task's label on the left, the latest
//! notice in the centre and key hints on the right.

use ratatui::prelude::*;
use ratatui::widgets::Widget;
use stagehand_core::Theme;

/// Frames of the waiting spinner.
pub const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// How a notice is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    /// A user mistake such as an empty selection, shown inline.
    Warning,
    /// A failed action or external process.
    Error,
}

/// A message shown in the status bar until the next one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Status bar with left, center, and right sections
///
/// # Builder Pattern
///
/// ```ignore
/// let status = StatusBar::new(&theme)
///     .left("⠋ AI: generating commit message")
///     .center("no item selected", NoticeKind::Warning)
///     .right("q:quit");
/// ```
pub struct StatusBar<'a> {
    /// Waiting label, if a task runs
    left: &'a str,
    /// Latest notice
    center: &'a str,
    center_kind: NoticeKind,
    /// Key hints
    right: &'a str,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        StatusBar {
            left: "",
            center: "",
            center_kind: NoticeKind::Info,
            right: "",
            theme,
        }
    }

    /// Sets the left section text, drawn in the accent colour.
    pub fn left(mut self, text: &'a str) -> Self {
        self.left = text;
        self
    }

    /// Sets the notice text and its colour.
    pub fn center(mut self, text: &'a str, kind: NoticeKind) -> Self {
        self.center = text;
        self.center_kind = kind;
        self
    }

    /// Sets the right section text, right-aligned and muted.
    pub fn right(mut self, text: &'a str) -> Self {
        self.right = text;
        self
    }

    fn notice_color(&self) -> Color {
        match self.center_kind {
            NoticeKind::Info => self.theme.colors.success,
            NoticeKind::Warning => self.theme.colors.warning,
            NoticeKind::Error => self.theme.colors.error,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let bg = self.theme.colors.selection;
        for x in area.left()..area.right() {
            for y in area.top()..area.bottom() {
                buf[(x, y)].set_bg(bg);
            }
        }

        let width = area.width as usize;
        let mut used = 0usize;

        if !self.left.is_empty() {
            let text = format!(" {} ", self.left);
            let len = text.chars().count();
            if len <= width {
                let style = Style::default()
                    .fg(self.theme.colors.accent)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD);
                buf.set_string(area.x, area.y, &text, style);
                used = len;
            }
        }

        // Hints give way to the notice when space runs out.
        let notice = if self.center.is_empty() {
            String::new()
        } else {
            format!(" {} ", self.center)
        };
        let notice_len = notice.chars().count();
        if notice_len > 0 && used + notice_len <= width {
            let style = Style::default().fg(self.notice_color()).bg(bg);
            buf.set_string(area.x + used as u16, area.y, &notice, style);
            used += notice_len;
        }

        if !self.right.is_empty() {
            let text = format!(" {} ", self.right);
            let len = text.chars().count();
            if used + len <= width {
                let start_x = area.right().saturating_sub(len as u16);
                let style = Style::default().fg(self.theme.colors.muted).bg(bg);
                buf.set_string(start_x, area.y, &text, style);
            }
        }
    }
}
