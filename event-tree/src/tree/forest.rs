//! Forest of event tree nodes
//!
//! Nodes live in an arena in depth-first pre-order: a node is followed directly by
//! its whole subtree, so `nodes[i..subtree_end]` is the subtree rooted at `i`. Parent
//! links are plain indices and never own anything.

use super::raw::RawNode;
use crate::types::{CheckState, EventData, EventId, EventTreeError, NodeKey, Result};
use std::collections::HashMap;
use std::ops::Range;

/// Position of a node in its forest's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Whether a node is an event leaf or a grouping category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Event,
    Category,
}

/// One event or category node
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) key: NodeKey,
    pub(crate) label: String,
    pub(crate) event_data: EventData,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) subtree_end: usize,
    pub(crate) depth: usize,
    /// False for categories with no event leaf anywhere below them
    pub(crate) selectable: bool,
    pub(crate) check_state: CheckState,
    pub(crate) expanded: bool,
}

impl TreeNode {
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn id(&self) -> Option<&EventId> {
        self.key.event_id()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn event_data(&self) -> &EventData {
        &self.event_data
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Event
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn check_state(&self) -> CheckState {
        self.check_state
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

/// All trees produced by one fetch for a (source, date) slot
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeIndex>,
    index: HashMap<NodeKey, NodeIndex>,
}

impl Forest {
    /// Create an empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from raw nodes
    ///
    /// Every node starts Unchecked and collapsed. Fails if two nodes share an id.
    pub fn build(raw: Vec<RawNode>) -> Result<Self> {
        let mut forest = Forest::new();
        let mut path = Vec::new();
        for (i, node) in raw.into_iter().enumerate() {
            path.push(i);
            let idx = forest.insert(node, None, &mut path)?;
            forest.roots.push(idx);
            path.pop();
        }
        log::debug!(
            "Built forest: {} roots, {} nodes",
            forest.roots.len(),
            forest.nodes.len()
        );
        Ok(forest)
    }

    fn insert(
        &mut self,
        raw: RawNode,
        parent: Option<NodeIndex>,
        path: &mut Vec<usize>,
    ) -> Result<NodeIndex> {
        let idx = NodeIndex(self.nodes.len());
        let key = match raw.id {
            Some(id) => NodeKey::Id(id),
            None => NodeKey::Path(path.clone()),
        };
        // Paths are unique by construction; only source ids can collide
        if let NodeKey::Id(id) = &key {
            if self.index.contains_key(&key) {
                return Err(EventTreeError::DuplicateNodeId(id.clone()));
            }
        }
        self.index.insert(key.clone(), idx);

        let kind = if raw.children.is_some() {
            NodeKind::Category
        } else {
            NodeKind::Event
        };
        self.nodes.push(TreeNode {
            key,
            label: raw.label,
            event_data: raw.event_data.unwrap_or_default(),
            kind,
            parent,
            children: Vec::new(),
            subtree_end: idx.0 + 1,
            depth: path.len() - 1,
            selectable: kind == NodeKind::Event,
            check_state: CheckState::Unchecked,
            expanded: false,
        });

        let mut children = Vec::new();
        for (i, child) in raw.children.unwrap_or_default().into_iter().enumerate() {
            path.push(i);
            children.push(self.insert(child, Some(idx), path)?);
            path.pop();
        }

        let selectable = kind == NodeKind::Event
            || children.iter().any(|child| self.nodes[child.0].selectable);
        let end = self.nodes.len();
        let node = &mut self.nodes[idx.0];
        node.children = children;
        node.selectable = selectable;
        node.subtree_end = end;
        Ok(idx)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Look up a node by key; stale keys from an earlier forest resolve to `None`
    pub fn resolve(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &TreeNode {
        &self.nodes[idx.0]
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIndex) -> &mut TreeNode {
        &mut self.nodes[idx.0]
    }

    pub fn get(&self, key: &NodeKey) -> Option<&TreeNode> {
        self.resolve(key).map(|idx| self.node(idx))
    }

    /// All nodes in depth-first order, children in source order
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &TreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i), node))
    }

    /// Arena range covering `idx` and all of its descendants
    pub(crate) fn subtree_range(&self, idx: NodeIndex) -> Range<usize> {
        idx.0..self.nodes[idx.0].subtree_end
    }

    /// Indices of `idx` and its descendants, in depth-first order
    pub(crate) fn subtree_indices(
        &self,
        idx: NodeIndex,
    ) -> impl DoubleEndedIterator<Item = NodeIndex> {
        self.subtree_range(idx).map(NodeIndex)
    }

    /// Nodes of the subtree rooted at `idx`, in depth-first order
    pub fn subtree(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, &TreeNode)> {
        let range = self.subtree_range(idx);
        self.nodes[range.clone()]
            .iter()
            .zip(range)
            .map(|(node, i)| (NodeIndex(i), node))
    }

    /// Number of event leaves in the subtree rooted at `idx`
    pub fn leaf_count(&self, idx: NodeIndex) -> usize {
        self.subtree(idx).filter(|(_, node)| node.is_leaf()).count()
    }

    /// Iterator from the parent of `idx` up to its root
    pub fn ancestors(&self, idx: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            forest: self,
            next: self.nodes[idx.0].parent,
        }
    }

    pub(crate) fn set_expanded_all(&mut self, expanded: bool) {
        for node in self.nodes.iter_mut() {
            if node.kind == NodeKind::Category {
                node.expanded = expanded;
            }
        }
    }

    /// Keys of categories whose state disagrees with their children
    ///
    /// Empty for every forest that went through the selection engine.
    pub fn tri_state_violations(&self) -> Vec<NodeKey> {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Category)
            .filter(|node| {
                let states = node
                    .children
                    .iter()
                    .map(|child| &self.nodes[child.0])
                    .filter(|child| child.selectable)
                    .map(|child| child.check_state);
                node.check_state != aggregate_states(states)
            })
            .map(|node| node.key.clone())
            .collect()
    }
}

/// Combine the states of a category's selectable children
///
/// No children at all yields Unchecked.
pub fn aggregate_states(states: impl IntoIterator<Item = CheckState>) -> CheckState {
    let mut any_checked = false;
    let mut any_unchecked = false;
    for state in states {
        match state {
            CheckState::Checked => any_checked = true,
            CheckState::Unchecked => any_unchecked = true,
            CheckState::Indeterminate => return CheckState::Indeterminate,
        }
        if any_checked && any_unchecked {
            return CheckState::Indeterminate;
        }
    }
    if any_checked {
        CheckState::Checked
    } else {
        CheckState::Unchecked
    }
}

pub struct Ancestors<'a> {
    forest: &'a Forest,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.forest.nodes[current.0].parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<RawNode> {
        vec![
            RawNode::category(
                "Flares",
                vec![RawNode::event("A", "Flare A"), RawNode::event("B", "Flare B")],
            ),
            RawNode::category(
                "CMEs",
                vec![
                    RawNode::category("Halo", vec![RawNode::event("C", "CME C")]),
                    RawNode::category("Nothing here", vec![]),
                ],
            ),
        ]
    }

    #[test]
    fn test_build_preorder_layout() {
        let forest = Forest::build(sample()).unwrap();
        assert_eq!(forest.len(), 7);
        assert_eq!(forest.roots().len(), 2);

        let labels: Vec<&str> = forest.iter().map(|(_, n)| n.label()).collect();
        assert_eq!(
            labels,
            vec!["Flares", "Flare A", "Flare B", "CMEs", "Halo", "CME C", "Nothing here"]
        );
        let flares = forest.roots()[0];
        assert_eq!(forest.subtree(flares).count(), 3);
        assert_eq!(forest.leaf_count(flares), 2);
    }

    #[test]
    fn test_subtree_ranges_cover_descendants() {
        let forest = Forest::build(sample()).unwrap();
        let flares = forest.roots()[0];
        let cmes = forest.roots()[1];
        assert_eq!(forest.subtree_range(flares), 0..3);
        assert_eq!(forest.subtree_range(cmes), 3..7);

        let halo = forest.resolve(&NodeKey::Path(vec![1, 0])).unwrap();
        assert_eq!(forest.subtree_range(halo), 4..6);
        let c = forest.resolve(&NodeKey::from("C")).unwrap();
        assert_eq!(forest.subtree_range(c), 5..6);
    }

    #[test]
    fn test_synthetic_keys_follow_path() {
        let forest = Forest::build(sample()).unwrap();
        assert!(forest.get(&NodeKey::Path(vec![0])).is_some());
        assert_eq!(
            forest.get(&NodeKey::Path(vec![1, 0])).unwrap().label(),
            "Halo"
        );
        assert_eq!(
            forest.get(&NodeKey::Path(vec![1, 1])).unwrap().label(),
            "Nothing here"
        );
        // Nodes with ids are keyed by id only
        assert!(forest.get(&NodeKey::Path(vec![0, 0])).is_none());
        assert_eq!(forest.get(&NodeKey::from("C")).unwrap().depth(), 2);

        // Rebuilding the same response yields the same keys
        let again = Forest::build(sample()).unwrap();
        let keys: Vec<_> = forest.iter().map(|(_, n)| n.key().clone()).collect();
        let keys_again: Vec<_> = again.iter().map(|(_, n)| n.key().clone()).collect();
        assert_eq!(keys, keys_again);
    }

    #[test]
    fn test_selectable_and_parents() {
        let forest = Forest::build(sample()).unwrap();
        let empty = forest.resolve(&NodeKey::Path(vec![1, 1])).unwrap();
        assert!(!forest.node(empty).is_selectable());
        let cmes = forest.roots()[1];
        assert!(forest.node(cmes).is_selectable());

        let c = forest.resolve(&NodeKey::from("C")).unwrap();
        let ancestors: Vec<&str> = forest
            .ancestors(c)
            .map(|idx| forest.node(idx).label())
            .collect();
        assert_eq!(ancestors, vec!["Halo", "CMEs"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let raw = vec![
            RawNode::event("A", "first"),
            RawNode::category("group", vec![RawNode::event("A", "second")]),
        ];
        match Forest::build(raw) {
            Err(EventTreeError::DuplicateNodeId(id)) => assert_eq!(id.as_str(), "A"),
            other => panic!("expected duplicate id error, got {:?}", other.map(|f| f.len())),
        }
    }

    #[test]
    fn test_aggregate_states() {
        use CheckState::*;
        assert_eq!(aggregate_states([] as [CheckState; 0]), Unchecked);
        assert_eq!(aggregate_states([Checked, Checked]), Checked);
        assert_eq!(aggregate_states([Unchecked, Unchecked]), Unchecked);
        assert_eq!(aggregate_states([Checked, Unchecked]), Indeterminate);
        assert_eq!(aggregate_states([Checked, Indeterminate]), Indeterminate);
    }
}
