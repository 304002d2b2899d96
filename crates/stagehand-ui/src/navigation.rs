//! Directional navigation between panels.
//!
//! Every panel declares its neighbours literally; resolving a direction is
//! a table lookup with no geometry involved.

use crate::focus::FocusRouter;
use crossterm::event::KeyEvent;
use stagehand_core::config::{self, Config};
use stagehand_core::{ContextKey, CoreError, CoreResult, Direction, KeySpec};
use std::collections::HashMap;

/// Literal neighbours of one context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    pub prev_block: Option<ContextKey>,
    pub next_block: Option<ContextKey>,
    pub next_item: Option<ContextKey>,
}

impl Edges {
    pub const fn new(
        prev_block: Option<ContextKey>,
        next_block: Option<ContextKey>,
        next_item: Option<ContextKey>,
    ) -> Self {
        Edges {
            prev_block,
            next_block,
            next_item,
        }
    }

    pub fn get(&self, direction: Direction) -> Option<ContextKey> {
        match direction {
            Direction::PrevBlock => self.prev_block,
            Direction::NextBlock => self.next_block,
            Direction::NextItem => self.next_item,
        }
    }
}

/// The navigation graph.
#[derive(Debug, Clone, Default)]
pub struct NavigationGrid {
    edges: HashMap<ContextKey, Edges>,
}

impl NavigationGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph for the staging panel layout.
    ///
    /// ```text
    /// stagedFiles -> commitInput -> [ AI ] -> [ Commit ] -> [ Push ] -> stagedFiles
    /// ```
    ///
    /// `NextItem` from any button goes back to the file list.
    pub fn standard() -> Self {
        use ContextKey as K;
        let mut grid = NavigationGrid::new();
        grid.insert(
            K::STAGED_FILES,
            Edges::new(Some(K::COMMIT_PUSH_BUTTON), Some(K::COMMIT_INPUT), None),
        );
        grid.insert(
            K::COMMIT_INPUT,
            Edges::new(Some(K::STAGED_FILES), Some(K::COMMIT_GENERATE_BUTTON), None),
        );
        grid.insert(
            K::COMMIT_GENERATE_BUTTON,
            Edges::new(
                Some(K::COMMIT_INPUT),
                Some(K::COMMIT_BUTTON),
                Some(K::STAGED_FILES),
            ),
        );
        grid.insert(
            K::COMMIT_BUTTON,
            Edges::new(
                Some(K::COMMIT_GENERATE_BUTTON),
                Some(K::COMMIT_PUSH_BUTTON),
                Some(K::STAGED_FILES),
            ),
        );
        grid.insert(
            K::COMMIT_PUSH_BUTTON,
            Edges::new(
                Some(K::COMMIT_BUTTON),
                Some(K::STAGED_FILES),
                Some(K::STAGED_FILES),
            ),
        );
        grid
    }

    pub fn insert(&mut self, key: ContextKey, edges: Edges) {
        self.edges.insert(key, edges);
    }

    /// Target of `direction` from `from`, if the edge exists.
    pub fn resolve(&self, from: ContextKey, direction: Direction) -> Option<ContextKey> {
        self.edges.get(&from).and_then(|e| e.get(direction))
    }

    /// Checks that every edge source and target is a registered,
    /// focusable context.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ContextNotFound` or `CoreError::NotFocusable`
    /// for the first bad key.
    pub fn validate(&self, router: &FocusRouter) -> CoreResult<()> {
        let targets = self.edges.values().flat_map(|e| {
            [e.prev_block, e.next_block, e.next_item]
                .into_iter()
                .flatten()
        });
        for key in self.edges.keys().copied().chain(targets) {
            if router.controller(key).is_none() {
                return Err(CoreError::ContextNotFound(key.to_string()));
            }
            if !router.is_focusable(key) {
                return Err(CoreError::NotFocusable(key.to_string()));
            }
        }
        Ok(())
    }
}

/// Keys bound to each navigation direction.
#[derive(Debug, Clone, Default)]
pub struct NavigationKeys {
    keys: Vec<(KeySpec, Direction)>,
}

impl NavigationKeys {
    pub fn from_config(config: &Config) -> Self {
        let u = &config.keybinding.universal;
        let groups = [
            (
                Direction::PrevBlock,
                [&u.prev_block, &u.prev_block_alt, &u.prev_block_alt2].to_vec(),
            ),
            (
                Direction::NextBlock,
                [&u.next_block, &u.next_block_alt, &u.next_block_alt2].to_vec(),
            ),
            (Direction::NextItem, [&u.next_item, &u.next_item_alt].to_vec()),
        ];
        let keys = groups
            .into_iter()
            .flat_map(|(direction, bindings)| {
                config::keys(bindings)
                    .into_iter()
                    .map(move |key| (key, direction))
            })
            .collect();
        NavigationKeys { keys }
    }

    /// Direction bound to `event`, if any.
    pub fn direction(&self, event: &KeyEvent) -> Option<Direction> {
        self.keys
            .iter()
            .find(|(key, _)| key.matches(event))
            .map(|(_, direction)| *direction)
    }
}
