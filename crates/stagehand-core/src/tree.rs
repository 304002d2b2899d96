//! File tree snapshots and the view model that flattens them into rows.
//!
//! Each refresh builds a new immutable [`FileTree`] from the status
//! entries and swaps it in. Nodes live in a flat arena and refer to
//! their children by index; there are no parent pointers, a node's
//! ancestors are found by path prefix.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// One changed file as reported by the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Slash-separated path relative to the repository root.
    pub path: String,
    pub tracked: bool,
    pub has_staged: bool,
    pub has_unstaged: bool,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, tracked: bool, has_staged: bool, has_unstaged: bool) -> Self {
        FileEntry {
            path: path.into(),
            tracked,
            has_staged,
            has_unstaged,
        }
    }
}

/// Which entries a panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayFilter {
    All,
    /// Files with changes in the index. The staged panel uses this.
    #[default]
    Staged,
    Unstaged,
}

impl DisplayFilter {
    pub fn accepts(&self, entry: &FileEntry) -> bool {
        match self {
            DisplayFilter::All => true,
            DisplayFilter::Staged => entry.has_staged,
            DisplayFilter::Unstaged => entry.has_unstaged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// A file or directory in a tree snapshot.
///
/// Directory flags are aggregated from their descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub path: String,
    /// Label shown in the row: the last path component in tree mode,
    /// the full path in flat mode.
    pub name: String,
    pub kind: NodeKind,
    pub tracked: bool,
    pub has_staged: bool,
    pub has_unstaged: bool,
    children: Vec<usize>,
}

impl FileNode {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// True if `other` lives somewhere below this directory.
    pub fn is_ancestor_of(&self, other: &FileNode) -> bool {
        self.is_dir()
            && other.path.len() > self.path.len()
            && other.path.starts_with(&self.path)
            && other.path.as_bytes()[self.path.len()] == b'/'
    }

    fn file(entry: &FileEntry, name: String) -> Self {
        FileNode {
            path: entry.path.clone(),
            name,
            kind: NodeKind::File,
            tracked: entry.tracked,
            has_staged: entry.has_staged,
            has_unstaged: entry.has_unstaged,
            children: Vec::new(),
        }
    }
}

/// Immutable tree built from one status snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    nodes: Vec<FileNode>,
    roots: Vec<usize>,
}

#[derive(Default)]
struct DirBuilder<'a> {
    dirs: BTreeMap<&'a str, DirBuilder<'a>>,
    files: Vec<&'a FileEntry>,
}

impl<'a> DirBuilder<'a> {
    fn insert(&mut self, components: &[&'a str], entry: &'a FileEntry) {
        match components {
            [] => {}
            [_] => self.files.push(entry),
            [dir, rest @ ..] => self.dirs.entry(*dir).or_default().insert(rest, entry),
        }
    }

    fn flush(self, prefix: &str, nodes: &mut Vec<FileNode>) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.dirs.len() + self.files.len());

        for (name, sub) in self.dirs {
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            };
            let children = sub.flush(&path, nodes);
            let any = |f: fn(&FileNode) -> bool| children.iter().any(|&c| f(&nodes[c]));
            let node = FileNode {
                tracked: any(|n| n.tracked),
                has_staged: any(|n| n.has_staged),
                has_unstaged: any(|n| n.has_unstaged),
                path,
                name: name.to_string(),
                kind: NodeKind::Directory,
                children,
            };
            nodes.push(node);
            ids.push(nodes.len() - 1);
        }

        let mut files = self.files;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        for entry in files {
            let name = entry.path.rsplit('/').next().unwrap_or(&entry.path).to_string();
            nodes.push(FileNode::file(entry, name));
            ids.push(nodes.len() - 1);
        }
        ids
    }
}

impl FileTree {
    /// Builds a tree (directories first, then files, each sorted by name)
    /// or, with `show_tree` off, a flat path-sorted list of files.
    pub fn build(entries: &[FileEntry], show_tree: bool) -> Self {
        let mut nodes = Vec::new();

        if !show_tree {
            let mut sorted: Vec<&FileEntry> = entries.iter().collect();
            sorted.sort_by(|a, b| a.path.cmp(&b.path));
            let roots = sorted
                .into_iter()
                .map(|e| {
                    nodes.push(FileNode::file(e, e.path.clone()));
                    nodes.len() - 1
                })
                .collect();
            return FileTree { nodes, roots };
        }

        let mut builder = DirBuilder::default();
        for entry in entries {
            let components: Vec<&str> = entry.path.split('/').filter(|c| !c.is_empty()).collect();
            builder.insert(&components, entry);
        }
        let roots = builder.flush("", &mut nodes);
        FileTree { nodes, roots }
    }

    pub fn node(&self, id: usize) -> Option<&FileNode> {
        self.nodes.get(id)
    }

    pub fn find(&self, path: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every node in display order, ignoring collapsed state.
    pub fn display_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk(&self.roots, 0, &|_| true, &mut |id, _| out.push(id));
        out
    }

    /// Paths of all directories.
    pub fn dir_paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter(|n| n.is_dir()).map(|n| n.path.as_str())
    }

    fn walk(
        &self,
        ids: &[usize],
        depth: usize,
        descend: &dyn Fn(&FileNode) -> bool,
        visit: &mut dyn FnMut(usize, usize),
    ) {
        for &id in ids {
            visit(id, depth);
            let node = &self.nodes[id];
            if node.is_dir() && descend(node) {
                self.walk(&node.children, depth + 1, descend, visit);
            }
        }
    }
}

/// A visible row: a node and its indentation depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub node: usize,
    pub depth: usize,
}

/// Presentation state for one file panel.
///
/// Collapsed directories are remembered by path so they survive
/// refreshes.
#[derive(Debug, Clone)]
pub struct FileTreeViewModel {
    entries: Arc<Vec<FileEntry>>,
    tree: Arc<FileTree>,
    filter: DisplayFilter,
    show_tree: bool,
    collapsed: HashSet<String>,
    rows: Vec<Row>,
}

impl FileTreeViewModel {
    pub fn new(show_tree: bool, filter: DisplayFilter) -> Self {
        FileTreeViewModel {
            entries: Arc::new(Vec::new()),
            tree: Arc::new(FileTree::default()),
            filter,
            show_tree,
            collapsed: HashSet::new(),
            rows: Vec::new(),
        }
    }

    /// Replaces the snapshot with a new set of status entries.
    pub fn set_entries(&mut self, entries: Vec<FileEntry>) {
        self.entries = Arc::new(entries);
        self.rebuild();
    }

    pub fn entries(&self) -> &Arc<Vec<FileEntry>> {
        &self.entries
    }

    pub fn tree(&self) -> &Arc<FileTree> {
        &self.tree
    }

    pub fn filter(&self) -> DisplayFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: DisplayFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.rebuild();
        }
    }

    pub fn show_tree(&self) -> bool {
        self.show_tree
    }

    pub fn toggle_show_tree(&mut self) {
        self.show_tree = !self.show_tree;
        self.rebuild();
    }

    pub fn is_collapsed(&self, path: &str) -> bool {
        self.collapsed.contains(path)
    }

    pub fn toggle_collapsed(&mut self, path: &str) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.to_string());
        }
        self.rebuild_rows();
    }

    pub fn collapse_all(&mut self) {
        let dirs: Vec<String> = self.tree.dir_paths().map(str::to_string).collect();
        self.collapsed.extend(dirs);
        self.rebuild_rows();
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
        self.rebuild_rows();
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Node shown at a visible row.
    pub fn get(&self, row: usize) -> Option<&FileNode> {
        self.rows.get(row).and_then(|r| self.tree.node(r.node))
    }

    /// Visible row showing `path`, if any.
    pub fn row_of(&self, path: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| self.tree.node(r.node).is_some_and(|n| n.path == path))
    }

    fn rebuild(&mut self) {
        let filtered: Vec<FileEntry> = self
            .entries
            .iter()
            .filter(|e| self.filter.accepts(e))
            .cloned()
            .collect();
        self.tree = Arc::new(FileTree::build(&filtered, self.show_tree));
        self.rebuild_rows();
    }

    fn rebuild_rows(&mut self) {
        let mut rows = Vec::new();
        let collapsed = &self.collapsed;
        self.tree.walk(
            &self.tree.roots,
            0,
            &|n| !collapsed.contains(&n.path),
            &mut |node, depth| rows.push(Row { node, depth }),
        );
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<FileEntry> {
        vec![
            FileEntry::new("src/main.rs", true, true, false),
            FileEntry::new("README.md", true, true, true),
            FileEntry::new("src/ui/app.rs", false, true, false),
            FileEntry::new("notes.txt", false, false, true),
        ]
    }

    fn names(model: &FileTreeViewModel) -> Vec<String> {
        (0..model.len())
            .filter_map(|i| model.get(i))
            .map(|n| n.path.clone())
            .collect()
    }

    #[test]
    fn test_tree_puts_directories_first() {
        let mut model = FileTreeViewModel::new(true, DisplayFilter::All);
        model.set_entries(entries());
        assert_eq!(
            names(&model),
            vec![
                "src",
                "src/ui",
                "src/ui/app.rs",
                "src/main.rs",
                "README.md",
                "notes.txt"
            ]
        );
        assert_eq!(model.rows()[2].depth, 2);
    }

    #[test]
    fn test_staged_filter_hides_unstaged_only_files() {
        let mut model = FileTreeViewModel::new(true, DisplayFilter::Staged);
        model.set_entries(entries());
        assert!(model.row_of("notes.txt").is_none());
        assert!(model.row_of("README.md").is_some());
    }

    #[test]
    fn test_directory_flags_aggregate_children() {
        let tree = FileTree::build(&entries(), true);
        let src = tree.find("src").and_then(|id| tree.node(id)).expect("src dir");
        assert!(src.is_dir());
        assert!(src.tracked);
        assert!(src.has_staged);
        assert!(!src.has_unstaged);

        let ui = tree.find("src/ui").and_then(|id| tree.node(id)).expect("ui dir");
        assert!(!ui.tracked);
    }

    #[test]
    fn test_flat_mode_lists_files_only() {
        let mut model = FileTreeViewModel::new(false, DisplayFilter::All);
        model.set_entries(entries());
        assert_eq!(
            names(&model),
            vec!["README.md", "notes.txt", "src/main.rs", "src/ui/app.rs"]
        );
        assert_eq!(model.get(2).map(|n| n.name.as_str()), Some("src/main.rs"));
    }

    #[test]
    fn test_collapse_survives_refresh() {
        let mut model = FileTreeViewModel::new(true, DisplayFilter::All);
        model.set_entries(entries());
        model.toggle_collapsed("src");
        assert_eq!(names(&model), vec!["src", "README.md", "notes.txt"]);

        model.set_entries(entries());
        assert!(model.is_collapsed("src"));
        assert_eq!(model.len(), 3);

        model.toggle_collapsed("src");
        assert_eq!(model.len(), 6);
    }

    #[test]
    fn test_collapse_all_and_expand_all() {
        let mut model = FileTreeViewModel::new(true, DisplayFilter::All);
        model.set_entries(entries());
        model.collapse_all();
        assert!(model.is_collapsed("src/ui"));
        assert_eq!(model.len(), 3);
        model.expand_all();
        assert_eq!(model.len(), 6);
    }

    #[test]
    fn test_toggle_show_tree_rebuilds() {
        let mut model = FileTreeViewModel::new(true, DisplayFilter::All);
        model.set_entries(entries());
        model.toggle_show_tree();
        assert!(!model.show_tree());
        assert!(model.get(0).is_some_and(FileNode::is_file));
    }

    #[test]
    fn test_ancestor_check_uses_component_boundary() {
        let tree = FileTree::build(
            &[
                FileEntry::new("src/a.rs", true, true, false),
                FileEntry::new("srcx/b.rs", true, true, false),
            ],
            true,
        );
        let src = tree.node(tree.find("src").expect("src")).expect("node");
        let a = tree.node(tree.find("src/a.rs").expect("a")).expect("node");
        let b = tree.node(tree.find("srcx/b.rs").expect("b")).expect("node");
        assert!(src.is_ancestor_of(a));
        assert!(!src.is_ancestor_of(b));
    }

    #[test]
    fn test_display_order_ignores_collapse() {
        let tree = FileTree::build(&entries(), true);
        assert_eq!(tree.display_order().len(), 6);
    }
}
