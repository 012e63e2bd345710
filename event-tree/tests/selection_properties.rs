// Property tests for tri-state propagation and title normalization
use event_tree::{normalize, CheckState, Forest, NodeKey, NodeKind, RawNode, SelectionEngine};
use proptest::prelude::*;
use proptest::sample::Index;

fn raw_tree() -> impl Strategy<Value = RawNode> {
    let leaf = Just(RawNode {
        id: None,
        label: "event".to_string(),
        event_data: None,
        children: None,
    });
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|children| RawNode::category("group", children))
    })
}

fn raw_forest() -> impl Strategy<Value = Vec<RawNode>> {
    prop::collection::vec(raw_tree(), 1..4)
}

fn all_keys(forest: &Forest) -> Vec<NodeKey> {
    forest.iter().map(|(_, node)| node.key().clone()).collect()
}

fn selected_keys(forest: &Forest) -> Vec<NodeKey> {
    SelectionEngine::collect_selected_leaves(forest)
        .into_iter()
        .map(|node| node.key().clone())
        .collect()
}

/// Categories that have at least one event leaf below them
fn selectable_categories(forest: &Forest) -> Vec<NodeKey> {
    forest
        .iter()
        .filter(|(_, node)| node.kind() == NodeKind::Category && node.is_selectable())
        .map(|(_, node)| node.key().clone())
        .collect()
}

proptest! {
    #[test]
    fn tri_state_holds_after_every_call(
        roots in raw_forest(),
        ops in prop::collection::vec((any::<Index>(), any::<bool>(), 0u8..3), 1..24),
    ) {
        let mut forest = Forest::build(roots).unwrap();
        let keys = all_keys(&forest);

        for (pick, checked, op) in ops {
            let key = pick.get(&keys);
            match op {
                0 => { SelectionEngine::set_leaf_checked(&mut forest, key, checked); }
                1 => { SelectionEngine::set_category_checked(&mut forest, key, checked); }
                _ => { SelectionEngine::toggle(&mut forest, key); }
            }
            prop_assert!(forest.tri_state_violations().is_empty());
        }
    }

    #[test]
    fn checking_every_leaf_equals_checking_the_category(
        roots in raw_forest(),
        pick in any::<Index>(),
    ) {
        let mut by_leaves = Forest::build(roots.clone()).unwrap();
        let mut by_category = Forest::build(roots).unwrap();

        let categories = selectable_categories(&by_leaves);
        if categories.is_empty() {
            return Ok(());
        }
        let category = pick.get(&categories);

        let idx = by_leaves.resolve(category).unwrap();
        let leaves: Vec<NodeKey> = by_leaves
            .subtree(idx)
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.key().clone())
            .collect();
        for leaf in &leaves {
            SelectionEngine::set_leaf_checked(&mut by_leaves, leaf, true);
        }
        SelectionEngine::set_category_checked(&mut by_category, category, true);

        prop_assert_eq!(selected_keys(&by_leaves), selected_keys(&by_category));
        prop_assert_eq!(
            SelectionEngine::check_state(&by_leaves, category),
            Some(CheckState::Checked)
        );
    }

    #[test]
    fn rechecking_one_leaf_leaves_category_partial(
        roots in raw_forest(),
        pick_category in any::<Index>(),
        pick_leaf in any::<Index>(),
    ) {
        let mut forest = Forest::build(roots).unwrap();
        let categories = selectable_categories(&forest);
        if categories.is_empty() {
            return Ok(());
        }
        let category = pick_category.get(&categories).clone();
        let idx = forest.resolve(&category).unwrap();
        let leaves: Vec<NodeKey> = forest
            .subtree(idx)
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.key().clone())
            .collect();

        SelectionEngine::set_category_checked(&mut forest, &category, true);
        SelectionEngine::set_category_checked(&mut forest, &category, false);
        SelectionEngine::set_leaf_checked(&mut forest, pick_leaf.get(&leaves), true);

        let expected = if leaves.len() == 1 {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        };
        prop_assert_eq!(SelectionEngine::check_state(&forest, &category), Some(expected));
    }

    #[test]
    fn normalize_leaves_plain_text_alone(text in "[a-tv-zA-Z0-9 .,:;!?()'\"/-]{0,64}") {
        let once = normalize(&text);
        prop_assert_eq!(&once, &text);
        prop_assert_eq!(normalize(&once), once.clone());
    }

    #[test]
    fn normalize_is_deterministic(text in "\\PC{0,64}") {
        prop_assert_eq!(normalize(&text), normalize(&text));
    }
}
