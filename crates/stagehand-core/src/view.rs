//! Views: the rendered text surfaces that contexts draw into.
//!
//! A [`View`] holds the lines last rendered for it, its scroll origin and
//! the screen area it occupied during the last frame. Mouse handling
//! reads these back to map clicks onto model rows.

use ratatui::layout::Rect;
use std::collections::HashMap;

/// Single-line text editor state, used by the commit message input.
///
/// The cursor is a character index, never a byte index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextArea {
    text: String,
    cursor: usize,
}

impl TextArea {
    /// Creates an empty text area.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Inserts a character at the cursor. Newlines become spaces.
    pub fn type_char(&mut self, ch: char) {
        let ch = if ch == '\n' || ch == '\r' { ' ' } else { ch };
        let byte = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte, ch);
        self.cursor += 1;
    }

    /// Inserts a string at the cursor, one character at a time.
    pub fn type_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.type_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let b0 = char_to_byte_index(&self.text, self.cursor - 1);
        let b1 = char_to_byte_index(&self.text, self.cursor);
        self.text.replace_range(b0..b1, "");
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let b0 = char_to_byte_index(&self.text, self.cursor);
        let b1 = char_to_byte_index(&self.text, self.cursor + 1);
        self.text.replace_range(b0..b1, "");
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// A named rendering surface.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub name: &'static str,
    pub title: String,
    /// Lines rendered into the view, one per row.
    pub lines: Vec<String>,
    /// Index of the first visible line.
    pub origin_y: usize,
    /// Screen area from the last frame, including borders.
    pub area: Rect,
    pub focused: bool,
    pub text_area: TextArea,
}

impl View {
    pub fn new(name: &'static str) -> Self {
        View {
            name,
            ..Self::default()
        }
    }

    /// Returns the line at a view-relative row, accounting for scroll.
    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(self.origin_y + row).map(String::as_str)
    }

    /// Maps a visible row to a line index.
    pub fn row_to_line(&self, row: usize) -> usize {
        self.origin_y + row
    }

    /// Converts an absolute screen position into a position inside the
    /// bordered content area. Returns `None` for clicks on the border or
    /// outside the view.
    pub fn content_position(&self, column: u16, row: u16) -> Option<(usize, usize)> {
        let inner_x = self.area.x.saturating_add(1);
        let inner_y = self.area.y.saturating_add(1);
        let inner_right = self.area.right().saturating_sub(1);
        let inner_bottom = self.area.bottom().saturating_sub(1);
        if column < inner_x || column >= inner_right || row < inner_y || row >= inner_bottom {
            return None;
        }
        Some(((column - inner_x) as usize, (row - inner_y) as usize))
    }

    /// Returns true if the absolute screen position falls inside this view.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.right()
            && row >= self.area.y
            && row < self.area.bottom()
    }

    /// Scrolls so that `line` is visible in a view of `height` rows.
    pub fn focus_line(&mut self, line: usize, height: usize) {
        if height == 0 {
            return;
        }
        if line < self.origin_y {
            self.origin_y = line;
        } else if line >= self.origin_y + height {
            self.origin_y = line + 1 - height;
        }
    }
}

/// All views, keyed by name.
#[derive(Debug, Default)]
pub struct Views {
    views: HashMap<&'static str, View>,
}

impl Views {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the view if it does not exist yet and returns it.
    pub fn ensure(&mut self, name: &'static str) -> &mut View {
        self.views.entry(name).or_insert_with(|| View::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut View> {
        self.views.get_mut(name)
    }

    /// Finds the view under an absolute screen position.
    pub fn view_at(&self, column: u16, row: u16) -> Option<&View> {
        self.views.values().find(|v| v.contains(column, row))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
