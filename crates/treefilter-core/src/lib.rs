//! # treefilter-core
//!
//! The tri-state category filter engine for treefilter.
//!
//! Categories form a tree; each category's checkbox is Checked, Unchecked or
//! Indeterminate depending on its descendants. This crate:
//! - propagates a toggle down to every descendant and up to every ancestor
//! - merges freshly fetched category trees with the user's prior selections
//! - answers aggregate queries (checked ids, indeterminate flags) on any subtree
//!
//! ## Architectural Constraints
//!
//! The engine:
//! - Is synchronous: every operation is a bounded tree walk
//! - Keeps no ambient state; the host owns a `FilterSession` and passes it in
//! - Never fails silently: malformed trees are rejected as a whole
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod merger;
pub mod mutation;
pub mod primitives;
pub mod query;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CategoryId, CategoryNode, Children, FilterError, FilterNode, ItemId, RawTree, TreeState,
    TriState,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use merger::StateMerger;
pub use mutation::StateMutator;
pub use query::StateQuery;
pub use session::FilterSession;
