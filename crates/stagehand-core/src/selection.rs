//! List selection: a cursor, an optional range anchor and free-form picks.

use crate::tree::{FileNode, FileTreeViewModel};

/// Selection state for a file panel.
///
/// Three modes, in priority order: a range between the anchor and the
/// cursor, a set of individually picked paths, or just the cursor row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cursor: usize,
    anchor: Option<usize>,
    picked: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn picked(&self) -> &[String] {
        &self.picked
    }

    pub fn is_range(&self) -> bool {
        self.anchor.is_some()
    }

    /// Moves the cursor to `row`, clamped to a list of `len` rows.
    pub fn set_cursor(&mut self, row: usize, len: usize) {
        self.cursor = row.min(len.saturating_sub(1));
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        self.set_cursor(self.cursor + 1, len);
    }

    /// Starts a range at the cursor, or ends the current one.
    pub fn toggle_range(&mut self) {
        self.anchor = match self.anchor {
            Some(_) => None,
            None => Some(self.cursor),
        };
        self.picked.clear();
    }

    /// Adds or removes a path from the picks. Ends any range.
    pub fn toggle_pick(&mut self, path: &str) {
        self.anchor = None;
        if let Some(pos) = self.picked.iter().position(|p| p == path) {
            self.picked.remove(pos);
        } else {
            self.picked.push(path.to_string());
        }
    }

    /// Drops range and picks, keeping only the cursor.
    pub fn collapse_to_cursor(&mut self) {
        self.anchor = None;
        self.picked.clear();
    }

    /// Selects exactly one row.
    pub fn select_single(&mut self, row: usize, len: usize) {
        self.collapse_to_cursor();
        self.set_cursor(row, len);
    }

    /// Re-validates against a fresh snapshot: picks that no longer exist
    /// are dropped and the cursor and anchor are clamped.
    pub fn retain_existing(&mut self, model: &FileTreeViewModel) {
        let tree = model.tree();
        self.picked.retain(|p| tree.contains(p));
        let len = model.len();
        self.set_cursor(self.cursor, len);
        if let Some(anchor) = self.anchor {
            self.anchor = Some(anchor.min(len.saturating_sub(1)));
        }
        if len == 0 {
            self.anchor = None;
        }
    }

    /// Expands the selection into nodes, in display order.
    ///
    /// A range yields every visible row between anchor and cursor. Picks
    /// are used as given, including nodes hidden under a collapsed
    /// directory. Otherwise the cursor row alone is selected.
    pub fn selected_nodes<'a>(&self, model: &'a FileTreeViewModel) -> Vec<&'a FileNode> {
        if model.is_empty() {
            return Vec::new();
        }

        if let Some(anchor) = self.anchor {
            let (start, end) = if anchor <= self.cursor {
                (anchor, self.cursor)
            } else {
                (self.cursor, anchor)
            };
            return (start..=end).filter_map(|row| model.get(row)).collect();
        }

        if !self.picked.is_empty() {
            let tree = model.tree();
            return tree
                .display_order()
                .into_iter()
                .filter_map(|id| tree.node(id))
                .filter(|n| self.picked.iter().any(|p| *p == n.path))
                .collect();
        }

        model.get(self.cursor).into_iter().collect()
    }

    /// The node under the cursor.
    pub fn current<'a>(&self, model: &'a FileTreeViewModel) -> Option<&'a FileNode> {
        model.get(self.cursor)
    }
}
