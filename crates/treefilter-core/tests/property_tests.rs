//! # Property-Based Tests
//!
//! Consistency invariants of the selection tree, checked with proptest over
//! randomly shaped category trees and random toggle sequences.

use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use treefilter_core::{
    CategoryId, CategoryNode, FilterNode, FilterSession, StateQuery, TreeState, TriState,
};

// =============================================================================
// TREE GENERATION
// =============================================================================

/// Build a raw tree from `(parent choice, item count)` pairs.
///
/// Node `i` gets id `i`. Its parent is `choice % (i + 1)`; picking `i` itself
/// makes it a root.
fn build_raw(shape: &[(usize, u64)]) -> Vec<CategoryNode> {
    let mut children: BTreeMap<Option<usize>, Vec<usize>> = BTreeMap::new();
    for (index, &(choice, _)) in shape.iter().enumerate() {
        let parent = choice % (index + 1);
        let key = if parent == index { None } else { Some(parent) };
        children.entry(key).or_default().push(index);
    }

    fn build(
        index: usize,
        shape: &[(usize, u64)],
        children: &BTreeMap<Option<usize>, Vec<usize>>,
    ) -> CategoryNode {
        let mut node = CategoryNode::new(index as u64, format!("c{index}")).with_items(shape[index].1);
        if let Some(kids) = children.get(&Some(index)) {
            node = node.with_children(kids.iter().map(|&k| build(k, shape, children)).collect());
        }
        node
    }

    children
        .get(&None)
        .map(|roots| roots.iter().map(|&r| build(r, shape, &children)).collect())
        .unwrap_or_default()
}

fn shape_strategy() -> impl Strategy<Value = Vec<(usize, u64)>> {
    vec((0usize..64, 0u64..4), 1..30)
}

fn toggles_strategy() -> impl Strategy<Value = Vec<(u64, bool)>> {
    vec((0u64..30, any::<bool>()), 0..20)
}

fn all_nodes(nodes: &[FilterNode]) -> Vec<&FilterNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&FilterNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        if let Some(children) = node.children() {
            stack.extend(children.iter().rev());
        }
    }
    out
}

fn descendants(node: &FilterNode) -> Vec<&FilterNode> {
    node.children().map(all_nodes).unwrap_or_default()
}

fn session_for(shape: &[(usize, u64)]) -> FilterSession {
    let mut session = FilterSession::new();
    session.merge(&build_raw(shape)).expect("generated trees are valid");
    session
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// A toggle forces the whole subtree below the node to the same value.
    #[test]
    fn toggle_cascades_to_every_descendant(
        shape in shape_strategy(),
        target in 0u64..30,
        value in any::<bool>()
    ) {
        let mut session = session_for(&shape);
        let hit = session.set_checked(CategoryId(target), value);
        prop_assert_eq!(hit, (target as usize) < shape.len());

        if let Some(node) = session.find(CategoryId(target)) {
            prop_assert_eq!(node.state(), TriState::from_checked(value));
            for child in descendants(node) {
                prop_assert_eq!(child.checked, value);
                prop_assert!(!child.indeterminate);
            }
        }
    }

    /// After any toggle sequence every interior node agrees with its children.
    #[test]
    fn interior_flags_match_children(
        shape in shape_strategy(),
        toggles in toggles_strategy()
    ) {
        let mut session = session_for(&shape);
        for (id, value) in toggles {
            session.set_checked(CategoryId(id), value);
        }

        for node in all_nodes(session.tree()) {
            let Some(children) = node.children() else { continue };
            let countable: Vec<&FilterNode> = children.iter().filter(|c| c.item_count != Some(0)).collect();
            let values: BTreeSet<bool> = countable.iter().map(|c| c.checked).collect();
            let mixed = values.len() >= 2 || countable.iter().any(|c| c.indeterminate);

            prop_assert_eq!(node.indeterminate, mixed, "node {}", node.id);
            match StateQuery::aggregate_children_state(children) {
                Some(TriState::Indeterminate) => prop_assert!(!node.checked),
                Some(state) => prop_assert_eq!(node.state(), state),
                None => {}
            }
        }
    }

    /// Applying the same toggle twice equals applying it once.
    #[test]
    fn toggle_is_idempotent(
        shape in shape_strategy(),
        toggles in toggles_strategy(),
        target in 0u64..30,
        value in any::<bool>()
    ) {
        let mut session = session_for(&shape);
        for (id, v) in toggles {
            session.set_checked(CategoryId(id), v);
        }

        session.set_checked(CategoryId(target), value);
        let once = session.tree_state().clone();
        session.set_checked(CategoryId(target), value);

        prop_assert_eq!(session.tree_state(), &once);
    }

    /// Checked ids are unique and each names a checked node.
    #[test]
    fn checked_ids_are_unique_and_checked(
        shape in shape_strategy(),
        toggles in toggles_strategy()
    ) {
        let mut session = session_for(&shape);
        for (id, value) in toggles {
            session.set_checked(CategoryId(id), value);
        }

        let ids = session.checked_ids(None);
        let unique: BTreeSet<CategoryId> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
        for id in ids {
            prop_assert!(session.find(id).is_some_and(|n| n.checked));
        }
    }

    /// Re-merging the same raw tree keeps the selection exactly as it was.
    #[test]
    fn remerge_of_same_tree_is_stable(
        shape in shape_strategy(),
        toggles in toggles_strategy()
    ) {
        let mut session = session_for(&shape);
        for (id, value) in toggles {
            session.set_checked(CategoryId(id), value);
        }
        let before: TreeState = session.tree_state().clone();

        session.merge(&build_raw(&shape)).expect("valid");

        prop_assert_eq!(session.tree_state(), &before);
    }

    /// Merging keeps prior flags and starts new categories checked.
    #[test]
    fn merge_preserves_prior_and_defaults_new(
        shape in shape_strategy(),
        toggles in toggles_strategy(),
        extra in 1usize..5
    ) {
        let mut session = session_for(&shape);
        for (id, value) in toggles {
            session.set_checked(CategoryId(id), value);
        }
        let before = session.tree_state().clone();

        let mut raw = build_raw(&shape);
        for offset in 0..extra {
            let id = (shape.len() + offset) as u64;
            raw.push(CategoryNode::new(id, "new").with_items(1));
        }
        session.merge(&raw).expect("valid");

        for old in all_nodes(before.nodes()) {
            let merged = session.find(old.id).expect("id kept");
            prop_assert_eq!(merged.checked, old.checked);
            prop_assert_eq!(merged.indeterminate, old.indeterminate);
        }
        for offset in 0..extra {
            let id = CategoryId((shape.len() + offset) as u64);
            prop_assert_eq!(session.find(id).map(FilterNode::state), Some(TriState::Checked));
        }
    }
}
