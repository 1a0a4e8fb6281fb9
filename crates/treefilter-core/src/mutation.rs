//! # Mutation Engine
//!
//! Applies user toggles to a filter tree and repairs tri-state consistency.
//!
//! A toggle is absolute for the whole subtree beneath the toggled node.
//! Above it, every ancestor up to the root is recomputed from its children,
//! because a single deep toggle can change state arbitrarily far up.

use crate::query::StateQuery;
use crate::{CategoryId, FilterNode, TreeState, TriState};

/// The StateMutator consolidates all selection mutations.
pub struct StateMutator;

impl StateMutator {
    /// Check or uncheck one category.
    ///
    /// Returns `false` and leaves the tree untouched when the id is absent;
    /// stale ids are expected after a merge.
    pub fn set_checked(state: &mut TreeState, id: CategoryId, value: bool) -> bool {
        let nodes = state.nodes_mut();
        let Some(path) = StateQuery::path_to(nodes, id) else {
            tracing::debug!(category = %id, "Toggle ignored: category not in tree");
            return false;
        };

        if let Some(node) = StateQuery::node_at_path_mut(nodes, &path) {
            Self::cascade(node, value);
        }
        Self::recompute_ancestors(nodes, &path);

        tracing::debug!(
            category = %id,
            checked = value,
            depth = path.len(),
            "Category toggled"
        );
        true
    }

    /// Check or uncheck every category.
    pub fn set_all(state: &mut TreeState, value: bool) {
        for root in state.nodes_mut() {
            Self::cascade(root, value);
        }
        tracing::debug!(checked = value, "All categories toggled");
    }

    /// Apply a batch of toggles in order.
    ///
    /// Returns how many toggles hit a category in the tree.
    pub fn apply(state: &mut TreeState, toggles: &[(CategoryId, bool)]) -> usize {
        toggles
            .iter()
            .filter(|&&(id, value)| Self::set_checked(state, id, value))
            .count()
    }

    /// Derive a node's flags from its children.
    ///
    /// Returns the aggregate applied, or `None` when the node is a leaf or has
    /// no countable children, in which case the node is left untouched.
    pub fn recompute_from_children(node: &mut FilterNode) -> Option<TriState> {
        let aggregate = node
            .children()
            .and_then(StateQuery::aggregate_children_state)?;
        node.set_state(aggregate);
        Some(aggregate)
    }

    /// Force a node and all its descendants to one value.
    fn cascade(node: &mut FilterNode, value: bool) {
        node.set_state(TriState::from_checked(value));
        if let Some(children) = node.children_mut() {
            for child in children {
                Self::cascade(child, value);
            }
        }
    }

    /// Recompute every ancestor of the node at `path`, deepest first.
    fn recompute_ancestors(nodes: &mut [FilterNode], path: &[usize]) {
        for depth in (1..path.len()).rev() {
            if let Some(ancestor) = StateQuery::node_at_path_mut(nodes, &path[..depth]) {
                Self::recompute_from_children(ancestor);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Children;

    fn leaf(id: u64, items: Option<u64>) -> FilterNode {
        FilterNode::new(CategoryId(id), format!("c{id}"), items)
    }

    fn interior(id: u64, items: Option<u64>, children: Vec<FilterNode>) -> FilterNode {
        let mut node = leaf(id, items);
        node.children = Children::Interior(children);
        node
    }

    /// 1 ─┬─ 2 ─┬─ 3
    ///    │     └─ 4
    ///    └─ 5
    /// 6
    fn sample() -> TreeState {
        TreeState::from_nodes(vec![
            interior(
                1,
                Some(5),
                vec![
                    interior(2, Some(3), vec![leaf(3, Some(1)), leaf(4, Some(2))]),
                    leaf(5, Some(2)),
                ],
            ),
            leaf(6, Some(1)),
        ])
    }

    fn node(state: &TreeState, id: u64) -> &FilterNode {
        StateQuery::find(state.nodes(), CategoryId(id)).expect("node in tree")
    }

    #[test]
    fn toggle_cascades_to_descendants() {
        let mut state = sample();
        assert!(StateMutator::set_checked(&mut state, CategoryId(1), false));

        for id in 1..=5 {
            assert!(!node(&state, id).checked, "node {id}");
            assert!(!node(&state, id).indeterminate, "node {id}");
        }
        assert!(node(&state, 6).checked);
    }

    #[test]
    fn deep_toggle_marks_every_ancestor_indeterminate() {
        let mut state = sample();
        StateMutator::set_checked(&mut state, CategoryId(3), false);

        assert_eq!(node(&state, 3).state(), TriState::Unchecked);
        assert_eq!(node(&state, 2).state(), TriState::Indeterminate);
        assert_eq!(node(&state, 1).state(), TriState::Indeterminate);
        assert_eq!(node(&state, 6).state(), TriState::Checked);
    }

    #[test]
    fn deep_toggles_can_flip_the_root() {
        let mut state = sample();
        StateMutator::set_checked(&mut state, CategoryId(3), false);
        StateMutator::set_checked(&mut state, CategoryId(4), false);
        assert_eq!(node(&state, 2).state(), TriState::Unchecked);
        assert_eq!(node(&state, 1).state(), TriState::Indeterminate);

        StateMutator::set_checked(&mut state, CategoryId(5), false);
        assert_eq!(node(&state, 1).state(), TriState::Unchecked);

        StateMutator::set_checked(&mut state, CategoryId(2), true);
        StateMutator::set_checked(&mut state, CategoryId(5), true);
        assert_eq!(node(&state, 1).state(), TriState::Checked);
    }

    #[test]
    fn absent_id_is_a_no_op() {
        let mut state = sample();
        let before = state.clone();

        assert!(!StateMutator::set_checked(&mut state, CategoryId(404), false));
        assert_eq!(state, before);
    }

    #[test]
    fn toggle_is_idempotent() {
        let mut once = sample();
        StateMutator::set_checked(&mut once, CategoryId(4), false);

        let mut twice = sample();
        StateMutator::set_checked(&mut twice, CategoryId(4), false);
        StateMutator::set_checked(&mut twice, CategoryId(4), false);

        assert_eq!(once, twice);
    }

    #[test]
    fn zero_item_sibling_does_not_block_unanimity() {
        let mut state = TreeState::from_nodes(vec![interior(
            1,
            Some(2),
            vec![leaf(2, Some(2)), leaf(3, Some(0))],
        )]);

        StateMutator::set_checked(&mut state, CategoryId(2), false);

        assert_eq!(node(&state, 1).state(), TriState::Unchecked);
        // The zero-item sibling keeps its own flag.
        assert!(node(&state, 3).checked);
    }

    #[test]
    fn parent_without_countable_children_keeps_its_flags() {
        let mut state = TreeState::from_nodes(vec![interior(
            1,
            Some(0),
            vec![leaf(2, Some(0)), leaf(3, Some(0))],
        )]);

        StateMutator::set_checked(&mut state, CategoryId(2), false);

        assert_eq!(node(&state, 1).state(), TriState::Checked);
    }

    #[test]
    fn set_all_resets_every_node() {
        let mut state = sample();
        StateMutator::set_checked(&mut state, CategoryId(3), false);

        StateMutator::set_all(&mut state, true);
        for id in 1..=6 {
            assert_eq!(node(&state, id).state(), TriState::Checked, "node {id}");
        }

        StateMutator::set_all(&mut state, false);
        assert!(StateQuery::checked_ids(state.nodes()).is_empty());
    }

    #[test]
    fn apply_counts_hits() {
        let mut state = sample();
        let applied = StateMutator::apply(
            &mut state,
            &[
                (CategoryId(5), false),
                (CategoryId(99), false),
                (CategoryId(6), false),
            ],
        );

        assert_eq!(applied, 2);
        assert!(!node(&state, 5).checked);
        assert!(!node(&state, 6).checked);
    }

    #[test]
    fn recompute_from_children_reports_aggregate() {
        let mut parent = interior(1, None, vec![leaf(2, None), leaf(3, None)]);
        if let Some(children) = parent.children_mut() {
            children[0].checked = false;
        }

        assert_eq!(
            StateMutator::recompute_from_children(&mut parent),
            Some(TriState::Indeterminate)
        );
        assert!(parent.indeterminate);
        assert!(!parent.checked);

        let mut lone = leaf(4, None);
        assert_eq!(StateMutator::recompute_from_children(&mut lone), None);
        assert_eq!(lone.state(), TriState::Checked);
    }
}
