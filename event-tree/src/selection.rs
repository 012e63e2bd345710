//! Tri-state selection engine
//!
//! Applies check/uncheck requests to a [`Forest`] and keeps every category's state
//! equal to the aggregate of its selectable children:
//!
//! - Checked when all selectable children are Checked
//! - Unchecked when all are Unchecked (or when there are none)
//! - Indeterminate otherwise
//!
//! Leaves are set directly. Changes travel down to force a subtree, then back up
//! through the ancestors. The engine only ever looks at one forest.

use crate::tree::{aggregate_states, Forest, NodeIndex, NodeKind, TreeNode};
use crate::types::{CheckState, NodeKey};

/// Selection engine - propagates check states through a forest
pub struct SelectionEngine;

impl SelectionEngine {
    /// Check or uncheck a leaf and update its ancestors
    ///
    /// Returns `false` without touching the forest when the key does not resolve
    /// (stale key from an earlier forest) or names an inert category. A key that
    /// names a selectable category applies to its whole subtree.
    pub fn set_leaf_checked(forest: &mut Forest, key: &NodeKey, checked: bool) -> bool {
        Self::set_checked(forest, key, checked)
    }

    /// Force a category's whole subtree to `checked` and update its ancestors
    ///
    /// Inert categories (no event leaf below them) stay Unchecked, both when they are
    /// the target and when they sit inside the forced subtree.
    pub fn set_category_checked(forest: &mut Forest, key: &NodeKey, checked: bool) -> bool {
        Self::set_checked(forest, key, checked)
    }

    /// Label-click action
    ///
    /// A leaf flips. A Checked category clears its subtree; Unchecked and
    /// Indeterminate categories select their whole subtree.
    pub fn toggle(forest: &mut Forest, key: &NodeKey) -> bool {
        let Some(idx) = forest.resolve(key) else {
            log::trace!("Ignoring toggle for unknown node {}", key);
            return false;
        };
        let checked = !forest.node(idx).check_state().is_checked();
        Self::apply(forest, idx, checked)
    }

    /// Every Checked leaf, depth-first with children in source order
    pub fn collect_selected_leaves(forest: &Forest) -> Vec<&TreeNode> {
        forest
            .iter()
            .map(|(_, node)| node)
            .filter(|node| node.is_leaf() && node.check_state().is_checked())
            .collect()
    }

    /// Current state of a node, `None` for unknown keys
    pub fn check_state(forest: &Forest, key: &NodeKey) -> Option<CheckState> {
        forest.get(key).map(TreeNode::check_state)
    }

    /// Uncheck every node
    pub fn clear(forest: &mut Forest) {
        for root in forest.roots().to_vec() {
            Self::force_subtree(forest, root, false);
        }
    }

    fn set_checked(forest: &mut Forest, key: &NodeKey, checked: bool) -> bool {
        match forest.resolve(key) {
            Some(idx) => Self::apply(forest, idx, checked),
            None => {
                log::trace!("Ignoring check request for unknown node {}", key);
                false
            }
        }
    }

    fn apply(forest: &mut Forest, idx: NodeIndex, checked: bool) -> bool {
        if !forest.node(idx).is_selectable() {
            log::trace!(
                "Ignoring check request for empty category {}",
                forest.node(idx).key()
            );
            return false;
        }

        Self::force_subtree(forest, idx, checked);
        Self::propagate_up(forest, idx);
        true
    }

    /// Set every leaf under `idx` and recompute every category under it, bottom-up
    fn force_subtree(forest: &mut Forest, idx: NodeIndex, checked: bool) {
        let target = CheckState::from_bool(checked);

        // Reverse pre-order visits children before their parent.
        for node_idx in forest.subtree_indices(idx).rev() {
            match forest.node(node_idx).kind() {
                NodeKind::Event => forest.node_mut(node_idx).check_state = target,
                NodeKind::Category => Self::recompute(forest, node_idx),
            }
        }
    }

    /// Recompute ancestors of `idx`, stopping early once a state stops changing
    fn propagate_up(forest: &mut Forest, idx: NodeIndex) {
        let ancestors: Vec<NodeIndex> = forest.ancestors(idx).collect();
        for ancestor in ancestors {
            let before = forest.node(ancestor).check_state();
            Self::recompute(forest, ancestor);
            if forest.node(ancestor).check_state() == before {
                break;
            }
        }
    }

    fn recompute(forest: &mut Forest, idx: NodeIndex) {
        let state = aggregate_states(
            forest
                .node(idx)
                .children()
                .iter()
                .map(|&child| forest.node(child))
                .filter(|child| child.is_selectable())
                .map(TreeNode::check_state),
        );
        forest.node_mut(idx).check_state = state;
    }
}
