//! # Engine Primitives
//!
//! Hardcoded runtime constants for the treefilter engine.
//!
//! These are compiled into the binary and are immutable at runtime.
//!
//! ## Primitives
//!
//! 1. **Default Selection**: New categories start checked.
//! 2. **Input Bounds**: Every raw tree is bounded in depth, size and label length,
//!    so every walk over it terminates quickly.

/// Selection state given to categories that have no prior state.
///
/// A category the user has never seen is shown, not hidden.
pub const DEFAULT_CHECKED: bool = true;

/// Maximum nesting depth of a category tree (root level = 1).
///
/// - Raw trees deeper than this are rejected by the merger.
/// - Bounds recursion in every query and mutation.
/// - Stays well inside serde_json's nesting limit (two JSON levels per tree level).
pub const MAX_TREE_DEPTH: usize = 32;

/// Maximum number of categories in a single tree.
///
/// Trees larger than this are rejected to prevent memory exhaustion.
pub const MAX_TREE_NODES: usize = 100_000;

/// Maximum length for category labels, in bytes.
pub const MAX_LABEL_LENGTH: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_length_limit() {
        assert_eq!(MAX_LABEL_LENGTH, 256);
    }

    #[test]
    fn tree_bounds() {
        assert_eq!(MAX_TREE_DEPTH, 32);
        assert_eq!(MAX_TREE_NODES, 100_000);
    }
}
