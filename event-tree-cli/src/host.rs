//! Host-side composition of several tree instances
//!
//! Every tree reports its complete selection and hover set through its own
//! callbacks. The boards below fold those per-instance reports into the views a
//! host shows: one selection list and one hover set across all sources.

use event_tree::{NodeKey, SelectedEvent, TreeConfig, TreeController};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Position of a tree instance inside its host
pub type TreeSlot = usize;

/// Selection of all tree instances
///
/// Reports are kept per instance, not per source tag: a tree that switches source
/// keeps reporting into the same place, and every event carries its own tag.
#[derive(Debug, Default)]
pub struct SelectionBoard {
    per_tree: BTreeMap<TreeSlot, Vec<SelectedEvent>>,
    updates: usize,
}

impl SelectionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything previously reported by `tree` with `events`
    ///
    /// Each callback carries the full selection of its tree, so replacing the
    /// tree's subset keeps duplicates from piling up.
    pub fn replace(&mut self, tree: TreeSlot, events: &[SelectedEvent]) {
        self.per_tree.insert(tree, events.to_vec());
        self.updates += 1;
        log::debug!(
            "tree #{} now contributes {} events ({} total)",
            tree,
            events.len(),
            self.len()
        );
    }

    /// Every selected event, in instance order
    pub fn events(&self) -> Vec<SelectedEvent> {
        self.per_tree.values().flatten().cloned().collect()
    }

    pub fn for_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a SelectedEvent> {
        self.per_tree
            .values()
            .flatten()
            .filter(move |event| event.source == source)
    }

    pub fn len(&self) -> usize {
        self.per_tree.values().map(Vec::len).sum()
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}

/// Hovered node of one tree instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoveredNode {
    pub source: String,
    pub key: NodeKey,
}

/// Latest hover snapshot of every tree instance
#[derive(Debug, Default)]
pub struct HoverBoard {
    per_tree: BTreeMap<TreeSlot, Vec<NodeKey>>,
}

impl HoverBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest hover snapshot published by `tree`
    pub fn update(&mut self, tree: TreeSlot, keys: &[NodeKey]) {
        self.per_tree.insert(tree, keys.to_vec());
    }

    /// Everything hovered right now, in instance order
    ///
    /// Hover snapshots carry no source, so `source_of` names the current tag of
    /// each instance.
    pub fn union<'a>(&self, source_of: impl Fn(TreeSlot) -> Option<&'a str>) -> Vec<HoveredNode> {
        self.per_tree
            .iter()
            .filter_map(|(tree, keys)| source_of(*tree).map(|source| (source, keys)))
            .flat_map(|(source, keys)| {
                keys.iter().map(move |key| HoveredNode {
                    source: source.to_string(),
                    key: key.clone(),
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.per_tree.values().all(Vec::is_empty)
    }
}

/// The tree instances of one host plus the boards they report to
pub struct Host {
    trees: Vec<TreeController>,
    selection: Rc<RefCell<SelectionBoard>>,
    hover: Rc<RefCell<HoverBoard>>,
}

impl Host {
    /// Create one controller per configuration, wired to the shared boards
    pub fn new(configs: Vec<TreeConfig>) -> Self {
        let selection = Rc::new(RefCell::new(SelectionBoard::new()));
        let hover = Rc::new(RefCell::new(HoverBoard::new()));

        let trees = configs
            .into_iter()
            .enumerate()
            .map(|(slot, config)| {
                let selection_sink = Rc::clone(&selection);
                let hover_sink = Rc::clone(&hover);

                TreeController::new(config)
                    .on_events_update(move |events| {
                        selection_sink.borrow_mut().replace(slot, events)
                    })
                    .on_hovered_events_update(move |keys| {
                        hover_sink.borrow_mut().update(slot, keys)
                    })
            })
            .collect();

        Self {
            trees,
            selection,
            hover,
        }
    }

    pub fn trees(&self) -> &[TreeController] {
        &self.trees
    }

    pub fn trees_mut(&mut self) -> &mut [TreeController] {
        &mut self.trees
    }

    /// Tree currently showing `source`
    pub fn tree_mut(&mut self, source: &str) -> Option<&mut TreeController> {
        self.trees.iter_mut().find(|tree| tree.source() == source)
    }

    /// Merged selection of every instance
    pub fn selected(&self) -> Vec<SelectedEvent> {
        self.selection.borrow().events()
    }

    /// Number of selection callbacks received so far
    pub fn selection_updates(&self) -> usize {
        self.selection.borrow().updates()
    }

    /// Union of the hover sets of every instance, tagged with each tree's source
    pub fn hovered(&self) -> Vec<HoveredNode> {
        self.hover
            .borrow()
            .union(|slot| self.trees.get(slot).map(TreeController::source))
    }
}
