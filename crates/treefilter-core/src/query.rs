//! # Query Module
//!
//! Read-only aggregation and lookup over a filter tree.
//!
//! - Every lookup is tree-wide, depth-first, pre-order; the first match wins
//! - Nothing here mutates the tree
//! - Absent ids yield `None`, `false` or an empty list, never an error

use crate::{CategoryId, FilterNode, TriState};
use std::slice;

/// StateQuery groups the pure read operations of the engine.
pub struct StateQuery;

impl StateQuery {
    /// Aggregate the checkbox state of a list of siblings.
    ///
    /// Children with zero items are ignored. Returns `None` when no child is
    /// left to look at; the caller must then leave the parent untouched.
    /// A single indeterminate child makes the whole aggregate indeterminate.
    #[must_use]
    pub fn aggregate_children_state(children: &[FilterNode]) -> Option<TriState> {
        let mut aggregate = None;

        for child in children.iter().filter(|c| c.is_countable()) {
            let state = child.state();
            if state == TriState::Indeterminate {
                return Some(TriState::Indeterminate);
            }
            match aggregate {
                None => aggregate = Some(state),
                Some(seen) if seen != state => return Some(TriState::Indeterminate),
                Some(_) => {}
            }
        }

        aggregate
    }

    /// Recompute from the stored `checked` flags whether a node's direct
    /// children disagree.
    ///
    /// Zero-item children are ignored. Leaves and absent ids are never
    /// indeterminate.
    #[must_use]
    pub fn is_indeterminate(nodes: &[FilterNode], id: CategoryId) -> bool {
        let Some(children) = Self::children_of(nodes, id) else {
            return false;
        };

        let mut seen = None;
        for child in children.iter().filter(|c| c.is_countable()) {
            match seen {
                None => seen = Some(child.checked),
                Some(checked) if checked != child.checked => return true,
                Some(_) => {}
            }
        }
        false
    }

    /// Ids of every checked node, interior and leaf alike, in pre-order.
    #[must_use]
    pub fn checked_ids(nodes: &[FilterNode]) -> Vec<CategoryId> {
        let mut ids = Vec::new();
        Self::collect_checked(nodes, &mut ids);
        ids
    }

    /// Ids of every checked node in the subtree rooted at `root`, root included.
    ///
    /// Empty when `root` is not in the tree.
    #[must_use]
    pub fn checked_ids_under(nodes: &[FilterNode], root: CategoryId) -> Vec<CategoryId> {
        Self::find(nodes, root)
            .map(|node| Self::checked_ids(slice::from_ref(node)))
            .unwrap_or_default()
    }

    fn collect_checked(nodes: &[FilterNode], ids: &mut Vec<CategoryId>) {
        for node in nodes {
            if node.checked {
                ids.push(node.id);
            }
            if let Some(children) = node.children() {
                Self::collect_checked(children, ids);
            }
        }
    }

    /// Find a node anywhere in the tree.
    #[must_use]
    pub fn find(nodes: &[FilterNode], id: CategoryId) -> Option<&FilterNode> {
        for node in nodes {
            if node.id == id {
                return Some(node);
            }
            if let Some(found) = node.children().and_then(|c| Self::find(c, id)) {
                return Some(found);
            }
        }
        None
    }

    /// Find a node anywhere in the tree, mutably.
    pub fn find_mut(nodes: &mut [FilterNode], id: CategoryId) -> Option<&mut FilterNode> {
        let path = Self::path_to(nodes, id)?;
        Self::node_at_path_mut(nodes, &path)
    }

    /// Children of the node with the given id.
    ///
    /// `None` when the id is absent or the node is a leaf.
    #[must_use]
    pub fn children_of(nodes: &[FilterNode], id: CategoryId) -> Option<&[FilterNode]> {
        Self::find(nodes, id).and_then(FilterNode::children)
    }

    /// Sibling indices leading from the roots to the first node with `id`.
    #[must_use]
    pub fn path_to(nodes: &[FilterNode], id: CategoryId) -> Option<Vec<usize>> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id == id {
                return Some(vec![index]);
            }
            if let Some(mut rest) = node.children().and_then(|c| Self::path_to(c, id)) {
                rest.insert(0, index);
                return Some(rest);
            }
        }
        None
    }

    /// Follow an index path produced by `path_to`.
    pub fn node_at_path_mut<'a>(
        nodes: &'a mut [FilterNode],
        path: &[usize],
    ) -> Option<&'a mut FilterNode> {
        let (&first, rest) = path.split_first()?;
        let mut node = nodes.get_mut(first)?;
        for &index in rest {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Total number of nodes in the tree.
    #[must_use]
    pub fn node_count(nodes: &[FilterNode]) -> usize {
        nodes
            .iter()
            .map(|node| 1 + node.children().map_or(0, Self::node_count))
            .sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================
