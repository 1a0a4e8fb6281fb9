//! # Merger Module
//!
//! Validation of raw category trees and reconciliation with prior selection state.
//!
//! - Validate every raw tree before building anything
//! - Reject malformed input as a whole; never apply half a tree
//! - Carry over only the two selection flags; shape, labels and item counts
//!   always come from the fresh raw tree

use crate::mutation::StateMutator;
use crate::primitives::{MAX_LABEL_LENGTH, MAX_TREE_DEPTH, MAX_TREE_NODES};
use crate::query::StateQuery;
use crate::{CategoryId, CategoryNode, Children, FilterError, FilterNode, TreeState};
use std::collections::{BTreeMap, BTreeSet};

/// Selection flags remembered from a previous tree: `(checked, indeterminate)`.
type PriorFlags = BTreeMap<CategoryId, (bool, bool)>;

/// The StateMerger turns raw provider trees into selection state.
pub struct StateMerger;

impl StateMerger {
    /// Validate a raw tree.
    ///
    /// A tree is valid if:
    /// - Every id appears once in the whole tree
    /// - It is at most `MAX_TREE_DEPTH` levels deep
    /// - It holds at most `MAX_TREE_NODES` categories
    /// - No label is longer than `MAX_LABEL_LENGTH` bytes
    ///
    /// The walk uses an explicit stack, so hostile nesting cannot exhaust
    /// the call stack.
    pub fn validate(raw: &[CategoryNode]) -> Result<(), FilterError> {
        let mut seen = BTreeSet::new();
        let mut count = 0usize;
        let mut stack: Vec<(&CategoryNode, usize)> = raw.iter().rev().map(|n| (n, 1)).collect();

        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_TREE_DEPTH {
                return Err(FilterError::DepthExceeded {
                    limit: MAX_TREE_DEPTH,
                });
            }

            count += 1;
            if count > MAX_TREE_NODES {
                return Err(FilterError::TooManyNodes {
                    limit: MAX_TREE_NODES,
                });
            }

            if node.label.len() > MAX_LABEL_LENGTH {
                return Err(FilterError::LabelTooLong {
                    id: node.id,
                    limit: MAX_LABEL_LENGTH,
                });
            }

            if !seen.insert(node.id) {
                return Err(FilterError::DuplicateId(node.id));
            }

            if let Some(children) = &node.children {
                stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
            }
        }

        Ok(())
    }

    /// Build selection state for a raw tree.
    ///
    /// Without a previous tree (or with an empty one) every category starts
    /// checked. Otherwise each category takes the flags of the first node with
    /// the same id anywhere in `previous`, new categories start checked, and
    /// every interior node is then recomputed bottom-up from its children.
    pub fn merge(
        raw: &[CategoryNode],
        previous: Option<&[FilterNode]>,
    ) -> Result<Vec<FilterNode>, FilterError> {
        Self::validate(raw)?;

        let mut prior = PriorFlags::new();
        if let Some(previous) = previous {
            Self::index_flags(previous, &mut prior);
        }

        Ok(Self::merge_level(raw, &prior))
    }

    /// Merge a raw tree into a live state.
    ///
    /// All-or-nothing: on error the state is left exactly as it was.
    pub fn merge_into(state: &mut TreeState, raw: &[CategoryNode]) -> Result<(), FilterError> {
        let merged = match Self::merge(raw, Some(state.nodes())) {
            Ok(merged) => merged,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected malformed category tree");
                return Err(e);
            }
        };

        tracing::debug!(
            previous_nodes = StateQuery::node_count(state.nodes()),
            merged_nodes = StateQuery::node_count(&merged),
            "Category tree merged"
        );
        state.replace(merged);
        Ok(())
    }

    /// Record the flags of every node, keeping the first occurrence of an id.
    fn index_flags(nodes: &[FilterNode], prior: &mut PriorFlags) {
        for node in nodes {
            prior
                .entry(node.id)
                .or_insert((node.checked, node.indeterminate));
            if let Some(children) = node.children() {
                Self::index_flags(children, prior);
            }
        }
    }

    fn merge_level(raw: &[CategoryNode], prior: &PriorFlags) -> Vec<FilterNode> {
        raw.iter()
            .map(|category| Self::merge_node(category, prior))
            .collect()
    }

    fn merge_node(category: &CategoryNode, prior: &PriorFlags) -> FilterNode {
        let mut node = FilterNode::new(category.id, category.label.clone(), category.item_count);

        if let Some(&(checked, indeterminate)) = prior.get(&category.id) {
            node.checked = checked;
            node.indeterminate = indeterminate;
        }

        if let Some(children) = &category.children {
            node.children = Children::Interior(Self::merge_level(children, prior));
            StateMutator::recompute_from_children(&mut node);
        }

        node
    }
}

// =============================================================================
// TESTS
// =============================================================================
