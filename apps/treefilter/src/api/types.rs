//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use treefilter_core::{CategoryId, FilterNode, FilterSession};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SESSION STATUS
// =============================================================================

/// Summary of the hosted filter session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub categorized: bool,
    pub category_count: usize,
    pub checked_count: usize,
    pub selected_item: Option<u64>,
    pub active_category: Option<u64>,
}

impl SessionResponse {
    /// Summarize a session.
    #[must_use]
    pub fn from_session(session: &FilterSession) -> Self {
        Self {
            categorized: session.is_categorized(),
            category_count: session.category_count(),
            checked_count: session.checked_ids(None).len(),
            selected_item: session.selected_item().map(|i| i.0),
            active_category: session.active_category().map(|c| c.0),
        }
    }
}

/// Request to change the item selection and active category.
///
/// Absent fields clear the corresponding filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub item: Option<u64>,
    #[serde(default)]
    pub category: Option<u64>,
}

// =============================================================================
// TREE
// =============================================================================

/// Full selection tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub categories: Vec<FilterNode>,
}

/// Result of merging a raw tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResponse {
    pub success: bool,
    pub category_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MergeResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(category_count: usize) -> Self {
        Self {
            success: true,
            category_count,
            error: None,
        }
    }

    /// Create an error response. `category_count` is the tree still in place.
    #[must_use]
    pub fn error(category_count: usize, message: impl Into<String>) -> Self {
        Self {
            success: false,
            category_count,
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// TOGGLE
// =============================================================================

/// Check or uncheck one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub id: u64,
    pub checked: bool,
}

/// Result of a toggle, with the resulting checked ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub checked_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToggleResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(checked_ids: &[CategoryId]) -> Self {
        Self {
            success: true,
            checked_ids: ids_to_u64(checked_ids),
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            checked_ids: Vec::new(),
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Query string of `GET /checked`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckedParams {
    pub root: Option<u64>,
}

/// Checked category ids, pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedResponse {
    pub ids: Vec<u64>,
}

impl CheckedResponse {
    /// Wrap a list of ids.
    #[must_use]
    pub fn new(ids: &[CategoryId]) -> Self {
        Self {
            ids: ids_to_u64(ids),
        }
    }
}

/// Indeterminate flag of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndeterminateResponse {
    pub id: u64,
    pub indeterminate: bool,
}

/// Generic error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// Create an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

fn ids_to_u64(ids: &[CategoryId]) -> Vec<u64> {
    ids.iter().map(|id| id.0).collect()
}
