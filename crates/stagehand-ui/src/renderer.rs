//! Layout and drawing of the staging panel
//!
//! # Layout Structure
//!
//! ```text
//! +-----------------------------------------------+
//! | Staged changes                                |
//! |                                               |
//! +-----------------------------------------------+
//! | commit message          | [ AI ] [ Commit ] [ Push ] |
//! +-----------------------------------------------+
//! status bar (1 line)
//! ```
//!
//! Every drawn view records its area so mouse clicks can be mapped back.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};
use stagehand_core::{Theme, View};

/// Height of the commit row, borders included.
pub const COMMIT_ROW_HEIGHT: u16 = 3;

/// Screen areas of every panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StagingLayout {
    pub files: Rect,
    pub input: Rect,
    pub generate: Rect,
    pub commit: Rect,
    pub push: Rect,
    pub status_bar: Rect,
}

impl StagingLayout {
    /// Splits `area`, giving the buttons their label width plus borders.
    ///
    /// # Example
    ///
    /// ```
    /// use stagehand_ui::renderer::StagingLayout;
    /// use ratatui::prelude::Rect;
    ///
    /// let layout = StagingLayout::new(Rect::new(0, 0, 80, 24), ["[ AI ]", "[ Commit ]", "[ Push ]"]);
    /// assert_eq!(layout.status_bar, Rect::new(0, 23, 80, 1));
    /// assert_eq!(layout.files.height, 20);
    /// assert_eq!(layout.push.right(), 80);
    /// ```
    #[must_use]
    pub fn new(area: Rect, labels: [&str; 3]) -> Self {
        if area.height < COMMIT_ROW_HEIGHT + 2 {
            // Too small for the commit row; the list gets everything.
            return StagingLayout {
                files: area,
                ..Self::default()
            };
        }

        let [files, commit_row, status_bar] = Layout::vertical([
            Constraint::Min(2),
            Constraint::Length(COMMIT_ROW_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(area);

        let width = |label: &str| label.chars().count() as u16 + 2;
        let [input, generate, commit, push] = Layout::horizontal([
            Constraint::Min(10),
            Constraint::Length(width(labels[0])),
            Constraint::Length(width(labels[1])),
            Constraint::Length(width(labels[2])),
        ])
        .areas(commit_row);

        StagingLayout {
            files,
            input,
            generate,
            commit,
            push,
            status_bar,
        }
    }
}

fn block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    Block::bordered()
        .title(title)
        .border_style(theme.border(focused))
}

/// Draws the file list, highlighting the cursor row and selected rows.
///
/// `selected` holds model rows; rows outside the visible window are
/// skipped.
pub fn draw_list(
    frame: &mut Frame,
    area: Rect,
    view: &mut View,
    theme: &Theme,
    cursor: Option<usize>,
    selected: &[usize],
) {
    view.area = area;
    let height = area.height.saturating_sub(2) as usize;
    if let Some(cursor) = cursor {
        view.focus_line(cursor, height);
    }
    if view.origin_y >= view.lines.len() {
        view.origin_y = 0;
    }

    let lines: Vec<Line> = view
        .lines
        .iter()
        .enumerate()
        .skip(view.origin_y)
        .take(height)
        .map(|(row, text)| {
            let style = if view.focused && Some(row) == cursor {
                theme.cursor_row()
            } else if selected.contains(&row) {
                Style::default().bg(theme.colors.selection)
            } else {
                Style::default().fg(theme.colors.foreground)
            };
            Line::styled(text.as_str(), style)
        })
        .collect();

    let widget = Paragraph::new(lines).block(block(&view.title, view.focused, theme));
    frame.render_widget(widget, area);
}

/// Draws the commit message editor and places the terminal cursor in it
/// while focused.
pub fn draw_input(frame: &mut Frame, area: Rect, view: &mut View, theme: &Theme) {
    view.area = area;
    let inner = area.width.saturating_sub(2) as usize;
    let cursor = view.text_area.cursor();
    // Horizontal scroll so the cursor stays visible.
    let skip = (cursor + 1).saturating_sub(inner);
    let visible: String = view.text_area.text().chars().skip(skip).take(inner).collect();
    view.lines = vec![view.text_area.text().to_string()];

    let style = if view.text_area.is_empty() && !view.focused {
        Style::default().fg(theme.colors.muted)
    } else {
        Style::default().fg(theme.colors.foreground)
    };
    let shown = if view.text_area.is_empty() && !view.focused {
        "commit message".to_string()
    } else {
        visible
    };

    let widget = Paragraph::new(Line::styled(shown, style))
        .block(block(&view.title, view.focused, theme));
    frame.render_widget(widget, area);

    if view.focused && area.width > 2 && area.height > 2 {
        let x = area.x + 1 + (cursor - skip) as u16;
        frame.set_cursor_position((x, area.y + 1));
    }
}

/// Draws a one-line button from its view's first line.
pub fn draw_button(frame: &mut Frame, area: Rect, view: &mut View, theme: &Theme) {
    view.area = area;
    let label = view.lines.first().map(String::as_str).unwrap_or_default();
    let style = if view.focused {
        Style::default()
            .fg(theme.colors.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.colors.foreground)
    };
    let widget = Paragraph::new(Line::styled(label, style)).block(block("", view.focused, theme));
    frame.render_widget(widget, area);
}
