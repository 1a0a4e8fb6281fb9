//! # Session Module
//!
//! The filtering session of one dashboard view.
//!
//! A `FilterSession` owns the category selection tree together with the
//! other session-scoped filters (the selected item and a single active
//! category). It is volatile: never written anywhere by the core, emptied by
//! `clear()`, and handed explicitly to whoever needs it.

use crate::merger::StateMerger;
use crate::mutation::StateMutator;
use crate::query::StateQuery;
use crate::{CategoryId, CategoryNode, FilterError, FilterNode, ItemId, TreeState};

/// A FilterSession combines the selection tree with the other dashboard filters.
///
/// The session is not internally synchronized. Hosts sharing it between
/// threads must hold one exclusive lock for every mutating call.
#[derive(Debug, Clone, Default)]
pub struct FilterSession {
    /// Category selection state.
    tree: TreeState,
    /// The item currently highlighted on the dashboard.
    selected_item: Option<ItemId>,
    /// A single category the item list is narrowed to.
    active_category: Option<CategoryId>,
}

impl FilterSession {
    /// Create a new empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session around an existing selection tree.
    #[must_use]
    pub fn with_tree(tree: TreeState) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Category tree
    // -------------------------------------------------------------------------

    /// Merge a freshly supplied raw tree into the selection state.
    ///
    /// The first merge builds the tree with every category checked. Later
    /// merges keep the user's selections. On error nothing changes.
    pub fn merge(&mut self, raw: &[CategoryNode]) -> Result<(), FilterError> {
        StateMerger::merge_into(&mut self.tree, raw)
    }

    /// Check or uncheck a category and everything below it.
    ///
    /// Returns `false` when the category is not in the tree.
    pub fn set_checked(&mut self, id: CategoryId, value: bool) -> bool {
        StateMutator::set_checked(&mut self.tree, id, value)
    }

    /// Check or uncheck every category.
    pub fn set_all(&mut self, value: bool) {
        StateMutator::set_all(&mut self.tree, value);
    }

    /// Apply a batch of toggles in order, returning how many hit the tree.
    pub fn apply(&mut self, toggles: &[(CategoryId, bool)]) -> usize {
        StateMutator::apply(&mut self.tree, toggles)
    }

    /// Checked category ids in pre-order, optionally limited to one subtree.
    #[must_use]
    pub fn checked_ids(&self, root: Option<CategoryId>) -> Vec<CategoryId> {
        match root {
            Some(root) => StateQuery::checked_ids_under(self.tree.nodes(), root),
            None => StateQuery::checked_ids(self.tree.nodes()),
        }
    }

    /// Whether the children of a category disagree.
    #[must_use]
    pub fn is_indeterminate(&self, id: CategoryId) -> bool {
        StateQuery::is_indeterminate(self.tree.nodes(), id)
    }

    /// Look up a category anywhere in the tree.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&FilterNode> {
        StateQuery::find(self.tree.nodes(), id)
    }

    /// Look up a category, reporting absence as an error.
    pub fn require(&self, id: CategoryId) -> Result<&FilterNode, FilterError> {
        self.find(id).ok_or(FilterError::CategoryNotFound(id))
    }

    /// The root categories of the selection tree.
    #[must_use]
    pub fn tree(&self) -> &[FilterNode] {
        self.tree.nodes()
    }

    /// The selection tree itself.
    #[must_use]
    pub fn tree_state(&self) -> &TreeState {
        &self.tree
    }

    /// Whether a category tree has been merged into this session.
    #[must_use]
    pub fn is_categorized(&self) -> bool {
        !self.tree.is_empty()
    }

    /// Total number of categories in the tree.
    #[must_use]
    pub fn category_count(&self) -> usize {
        StateQuery::node_count(self.tree.nodes())
    }

    // -------------------------------------------------------------------------
    // Item and category filters
    // -------------------------------------------------------------------------

    /// Remember the item highlighted on the dashboard.
    pub fn select_item(&mut self, item: ItemId) {
        self.selected_item = Some(item);
    }

    /// The highlighted item, if any.
    #[must_use]
    pub fn selected_item(&self) -> Option<ItemId> {
        self.selected_item
    }

    /// Forget the highlighted item.
    pub fn clear_item_selection(&mut self) {
        self.selected_item = None;
    }

    /// Narrow the item list to one category, or lift that restriction.
    pub fn set_active_category(&mut self, category: Option<CategoryId>) {
        self.active_category = category;
    }

    /// The category the item list is narrowed to, if any.
    #[must_use]
    pub fn active_category(&self) -> Option<CategoryId> {
        self.active_category
    }

    // -------------------------------------------------------------------------
    // Reset
    // -------------------------------------------------------------------------

    /// Drop the selection tree and every other filter.
    pub fn clear(&mut self) {
        self.clear_item_selection();
        self.active_category = None;
        self.tree.clear();
        tracing::debug!("Filter session cleared");
    }
}

// =============================================================================
// TESTS
// =============================================================================
