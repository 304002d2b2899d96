//! Text presentation of the file panel.
//!
//! The same strings are drawn on screen and read back by the hit test, so
//! anything that changes a row's layout here changes what a click hits.

use crate::hit_test::node_token;
use stagehand_core::tree::NodeKind;
use stagehand_core::FileTreeViewModel;

const EXPANDED: &str = "▼ ";
const COLLAPSED: &str = "▶ ";
const FILE_PAD: &str = "  ";

/// One display line per visible row.
pub fn render_lines(model: &FileTreeViewModel) -> Vec<String> {
    model
        .rows()
        .iter()
        .filter_map(|row| {
            let node = model.tree().node(row.node)?;
            let mut line = "  ".repeat(row.depth);
            if model.show_tree() {
                line.push_str(match node.kind {
                    NodeKind::Directory if model.is_collapsed(&node.path) => COLLAPSED,
                    NodeKind::Directory => EXPANDED,
                    NodeKind::File => FILE_PAD,
                });
            }
            line.push_str(&node.name);
            let token = node_token(model.filter(), node);
            if !token.is_empty() {
                line.push(' ');
                line.push_str(token);
            }
            Some(line)
        })
        .collect()
}

/// Panel title: the branch, if known, and the view mode.
pub fn files_title(branch: Option<&str>, show_tree: bool) -> String {
    let mode = if show_tree { "tree" } else { "flat" };
    match branch {
        Some(branch) => format!(" Staged changes ({branch}) [{mode}] "),
        None => format!(" Staged changes [{mode}] "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::{DisplayFilter, FileEntry};

    fn model(show_tree: bool) -> FileTreeViewModel {
        let mut model = FileTreeViewModel::new(show_tree, DisplayFilter::Staged);
        model.set_entries(vec![
            FileEntry::new("src/lib.rs", true, true, false),
            FileEntry::new("README.md", true, true, true),
        ]);
        model
    }

    #[test]
    fn test_tree_lines() {
        let lines = render_lines(&model(true));
        assert_eq!(lines, vec!["▼ src [-]", "    lib.rs [-]", "  README.md [-]"]);
    }

    #[test]
    fn test_collapsed_directory_arrow() {
        let mut model = model(true);
        model.toggle_collapsed("src");
        let lines = render_lines(&model);
        assert_eq!(lines, vec!["▶ src [-]", "  README.md [-]"]);
    }

    #[test]
    fn test_flat_lines_use_full_paths() {
        let lines = render_lines(&model(false));
        assert!(lines.contains(&"src/lib.rs [-]".to_string()));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_title() {
        assert_eq!(files_title(Some("main"), true), " Staged changes (main) [tree] ");
        assert_eq!(files_title(None, false), " Staged changes [flat] ");
    }
}
