//! # Core Type Definitions
//!
//! This module contains all data types of the treefilter engine:
//! - Category and item identifiers (`CategoryId`, `ItemId`)
//! - Raw provider input (`CategoryNode`, `RawTree`)
//! - Owned selection state (`FilterNode`, `Children`, `TreeState`)
//! - Checkbox states (`TriState`)
//! - Error types (`FilterError`)
//!
//! ## Ownership
//!
//! Raw trees are plain data handed over by the provider and never mutated.
//! The `TreeState` is the only place where selection state lives; it is owned
//! by the hosting session and passed explicitly into every operation.

use crate::primitives::DEFAULT_CHECKED;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a category.
///
/// Ids are unique across the whole tree; every lookup is tree-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a filterable item (a meter on the dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// RAW INPUT
// =============================================================================

/// A category as supplied by the tree provider.
///
/// `item_count` is `None` while the category's items have not been loaded yet.
/// `children` is `None` for leaves and for subtrees that are loaded lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    #[serde(default)]
    pub label: String,
    #[serde(
        default,
        alias = "itemCount",
        alias = "meters",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CategoryNode>>,
}

impl CategoryNode {
    /// Create a leaf category whose items are not loaded yet.
    #[must_use]
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id: CategoryId(id),
            label: label.into(),
            item_count: None,
            children: None,
        }
    }

    /// Set the number of items associated with this category.
    #[must_use]
    pub fn with_items(mut self, count: u64) -> Self {
        self.item_count = Some(count);
        self
    }

    /// Attach the full list of child categories.
    #[must_use]
    pub fn with_children(mut self, children: Vec<CategoryNode>) -> Self {
        self.children = Some(children);
        self
    }
}

/// A raw category tree payload.
///
/// Providers send either a bare list of root categories or an object
/// wrapping that list under `tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTree {
    /// `[...]`
    Bare(Vec<CategoryNode>),
    /// `{ "tree": [...] }`
    Wrapped { tree: Vec<CategoryNode> },
}

impl RawTree {
    /// Borrow the root categories.
    #[must_use]
    pub fn nodes(&self) -> &[CategoryNode] {
        match self {
            Self::Wrapped { tree } => tree,
            Self::Bare(nodes) => nodes,
        }
    }

    /// Take ownership of the root categories.
    #[must_use]
    pub fn into_nodes(self) -> Vec<CategoryNode> {
        match self {
            Self::Wrapped { tree } => tree,
            Self::Bare(nodes) => nodes,
        }
    }
}

impl From<Vec<CategoryNode>> for RawTree {
    fn from(nodes: Vec<CategoryNode>) -> Self {
        Self::Bare(nodes)
    }
}

// =============================================================================
// TRI-STATE
// =============================================================================

/// The three states of a category checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    Checked,
    Unchecked,
    /// Descendants disagree.
    Indeterminate,
}

impl TriState {
    /// The two-state value a toggle produces.
    #[must_use]
    pub const fn from_checked(checked: bool) -> Self {
        if checked {
            Self::Checked
        } else {
            Self::Unchecked
        }
    }
}

// =============================================================================
// FILTER NODE
// =============================================================================

/// Children of a filter node.
///
/// A node either carries every child the provider sent, or none at all.
/// On the wire this is an optional array.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Vec<FilterNode>>", into = "Option<Vec<FilterNode>>")]
pub enum Children {
    #[default]
    Leaf,
    Interior(Vec<FilterNode>),
}

impl Children {
    /// True when the node has no children list.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf)
    }
}

impl From<Option<Vec<FilterNode>>> for Children {
    fn from(children: Option<Vec<FilterNode>>) -> Self {
        children.map_or(Self::Leaf, Self::Interior)
    }
}

impl From<Children> for Option<Vec<FilterNode>> {
    fn from(children: Children) -> Self {
        match children {
            Children::Leaf => None,
            Children::Interior(nodes) => Some(nodes),
        }
    }
}

/// A category together with its selection state.
///
/// `checked` and `indeterminate` are always read together: an indeterminate
/// node reports `TriState::Indeterminate` whatever its `checked` flag says.
/// `item_count` mirrors the latest raw tree and is not selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterNode {
    pub id: CategoryId,
    pub label: String,
    pub checked: bool,
    pub indeterminate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Children::is_leaf")]
    pub children: Children,
}

impl FilterNode {
    /// Create a leaf node in the default (checked) state.
    #[must_use]
    pub fn new(id: CategoryId, label: impl Into<String>, item_count: Option<u64>) -> Self {
        Self {
            id,
            label: label.into(),
            checked: DEFAULT_CHECKED,
            indeterminate: false,
            item_count,
            children: Children::Leaf,
        }
    }

    /// Current checkbox state.
    #[must_use]
    pub fn state(&self) -> TriState {
        if self.indeterminate {
            TriState::Indeterminate
        } else {
            TriState::from_checked(self.checked)
        }
    }

    /// Overwrite both flags from a tri-state value.
    pub fn set_state(&mut self, state: TriState) {
        match state {
            TriState::Checked => {
                self.checked = true;
                self.indeterminate = false;
            }
            TriState::Unchecked => {
                self.checked = false;
                self.indeterminate = false;
            }
            TriState::Indeterminate => {
                self.checked = false;
                self.indeterminate = true;
            }
        }
    }

    /// Whether this node takes part in its parent's aggregation.
    ///
    /// Categories known to hold zero items are ignored. Categories whose
    /// items are not loaded yet still count.
    #[must_use]
    pub fn is_countable(&self) -> bool {
        self.item_count != Some(0)
    }

    /// Child nodes, or `None` for a leaf.
    #[must_use]
    pub fn children(&self) -> Option<&[FilterNode]> {
        match &self.children {
            Children::Leaf => None,
            Children::Interior(nodes) => Some(nodes),
        }
    }

    /// Mutable child nodes, or `None` for a leaf.
    pub fn children_mut(&mut self) -> Option<&mut [FilterNode]> {
        match &mut self.children {
            Children::Leaf => None,
            Children::Interior(nodes) => Some(nodes),
        }
    }
}

// =============================================================================
// TREE STATE
// =============================================================================

/// The owned selection-state tree of one filtering session.
///
/// Empty until the first raw tree is merged. Mutated in place by toggles and
/// merges; emptied again by `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeState {
    roots: Vec<FilterNode>,
}

impl TreeState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already built list of root nodes.
    #[must_use]
    pub fn from_nodes(roots: Vec<FilterNode>) -> Self {
        Self { roots }
    }

    /// Root nodes, in provider order.
    #[must_use]
    pub fn nodes(&self) -> &[FilterNode] {
        &self.roots
    }

    /// Mutable root nodes.
    pub fn nodes_mut(&mut self) -> &mut [FilterNode] {
        &mut self.roots
    }

    /// True when no tree has been merged yet (or after `clear`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Swap in a freshly merged tree.
    pub fn replace(&mut self, roots: Vec<FilterNode>) {
        self.roots = roots;
    }

    /// Drop the whole tree.
    pub fn clear(&mut self) {
        self.roots.clear();
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the treefilter system.
///
/// - Lookups of absent ids are not errors inside the core; they surface as
///   `None`, empty results or no-op toggles. `CategoryNotFound` exists for
///   hosts that need to report them.
/// - Every other core variant is malformed input rejected by a merge, which
///   leaves the existing state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The requested category is not part of the tree.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// The raw tree carries the same id more than once.
    #[error("Duplicate category id: {0}")]
    DuplicateId(CategoryId),

    /// The raw tree nests deeper than the engine accepts.
    #[error("Category tree deeper than {limit} levels")]
    DepthExceeded { limit: usize },

    /// The raw tree holds more categories than the engine accepts.
    #[error("Category tree larger than {limit} nodes")]
    TooManyNodes { limit: usize },

    /// A category label is longer than the engine accepts.
    #[error("Label of category {id} longer than {limit} bytes")]
    LabelTooLong { id: CategoryId, limit: usize },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FilterError {
    /// True for errors caused by a malformed raw tree.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId(_)
                | Self::DepthExceeded { .. }
                | Self::TooManyNodes { .. }
                | Self::LabelTooLong { .. }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_reads_flags_jointly() {
        let mut node = FilterNode::new(CategoryId(1), "a", Some(1));
        assert_eq!(node.state(), TriState::Checked);

        node.indeterminate = true;
        node.checked = true;
        assert_eq!(node.state(), TriState::Indeterminate);

        node.set_state(TriState::Unchecked);
        assert!(!node.checked);
        assert!(!node.indeterminate);

        node.set_state(TriState::Indeterminate);
        assert!(!node.checked);
        assert!(node.indeterminate);
    }

    #[test]
    fn zero_items_is_not_countable_but_unloaded_is() {
        assert!(!FilterNode::new(CategoryId(1), "a", Some(0)).is_countable());
        assert!(FilterNode::new(CategoryId(1), "a", None).is_countable());
        assert!(FilterNode::new(CategoryId(1), "a", Some(3)).is_countable());
    }

    #[test]
    fn raw_tree_accepts_bare_and_wrapped() {
        let bare: RawTree = serde_json::from_str(r#"[{"id":1,"label":"a"}]"#).expect("bare");
        let wrapped: RawTree =
            serde_json::from_str(r#"{"tree":[{"id":1,"label":"a"}]}"#).expect("wrapped");

        assert_eq!(bare.nodes(), wrapped.nodes());
        assert_eq!(bare.into_nodes().len(), 1);
    }

    #[test]
    fn raw_node_accepts_item_count_aliases() {
        let node: CategoryNode =
            serde_json::from_str(r#"{"id":4,"label":"x","meters":7}"#).expect("meters");
        assert_eq!(node.item_count, Some(7));

        let node: CategoryNode =
            serde_json::from_str(r#"{"id":4,"label":"x","itemCount":0}"#).expect("itemCount");
        assert_eq!(node.item_count, Some(0));

        let node: CategoryNode = serde_json::from_str(r#"{"id":4}"#).expect("minimal");
        assert_eq!(node.item_count, None);
        assert!(node.children.is_none());
    }

    #[test]
    fn filter_node_serializes_leaf_without_children() {
        let node = FilterNode::new(CategoryId(2), "leaf", Some(1));
        let json = serde_json::to_string(&node).expect("serialize");
        assert!(!json.contains("children"));

        let back: FilterNode = serde_json::from_str(&json).expect("deserialize");
        assert!(back.children.is_leaf());
    }

    #[test]
    fn filter_node_reads_children_array() {
        let json = r#"{"id":1,"label":"p","checked":false,"indeterminate":true,
            "children":[{"id":2,"label":"c","checked":true,"indeterminate":false}]}"#;
        let node: FilterNode = serde_json::from_str(json).expect("deserialize");

        let children = node.children().expect("interior");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, CategoryId(2));
    }

    #[test]
    fn tree_state_clear() {
        let mut state = TreeState::from_nodes(vec![FilterNode::new(CategoryId(1), "a", None)]);
        assert!(!state.is_empty());
        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn malformed_input_classification() {
        assert!(FilterError::DuplicateId(CategoryId(1)).is_malformed_input());
        assert!(FilterError::DepthExceeded { limit: 2 }.is_malformed_input());
        assert!(!FilterError::CategoryNotFound(CategoryId(1)).is_malformed_input());
        assert!(!FilterError::Io("x".into()).is_malformed_input());
    }
}
