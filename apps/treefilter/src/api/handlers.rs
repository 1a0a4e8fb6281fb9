//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Queries take the session read lock; merge, toggle, selection and clear
//! take the write lock for their whole duration, so a propagation is never
//! observed half-applied.

use super::{
    AppState,
    types::{
        CheckedParams, CheckedResponse, ErrorResponse, HealthResponse, IndeterminateResponse,
        MergeResponse, SelectionRequest, SessionResponse, ToggleRequest, ToggleResponse,
        TreeResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use treefilter_core::{CategoryId, FilterError, ItemId, RawTree};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SESSION HANDLERS
// =============================================================================

/// Get a summary of the session.
pub async fn session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    (StatusCode::OK, Json(SessionResponse::from_session(&session)))
}

/// Set or clear the selected item and active category.
pub async fn selection_handler(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;

    match request.item {
        Some(item) => session.select_item(ItemId(item)),
        None => session.clear_item_selection(),
    }
    session.set_active_category(request.category.map(CategoryId));

    (StatusCode::OK, Json(SessionResponse::from_session(&session)))
}

/// Drop the category tree and every other filter.
pub async fn clear_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    session.clear();
    tracing::info!("Filter session cleared");

    (StatusCode::OK, Json(SessionResponse::from_session(&session)))
}

// =============================================================================
// TREE HANDLERS
// =============================================================================

/// Get the full selection tree.
pub async fn tree_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let response = TreeResponse {
        categories: session.tree().to_vec(),
    };

    (StatusCode::OK, Json(response))
}

/// Merge a freshly fetched raw category tree.
pub async fn merge_handler(
    State(state): State<AppState>,
    Json(raw): Json<RawTree>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;

    match session.merge(raw.nodes()) {
        Ok(()) => {
            let count = session.category_count();
            tracing::info!(categories = count, "Category tree merged");
            (StatusCode::OK, Json(MergeResponse::success(count)))
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(MergeResponse::error(
                session.category_count(),
                format!("Malformed category tree: {}", e),
            )),
        ),
    }
}

/// Check or uncheck one category.
pub async fn toggle_handler(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> impl IntoResponse {
    let id = CategoryId(request.id);
    let mut session = state.session.write().await;

    if session.set_checked(id, request.checked) {
        (
            StatusCode::OK,
            Json(ToggleResponse::success(&session.checked_ids(None))),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ToggleResponse::error(
                FilterError::CategoryNotFound(id).to_string(),
            )),
        )
    }
}

// =============================================================================
// QUERY HANDLERS
// =============================================================================

/// Checked category ids, optionally under one root.
pub async fn checked_handler(
    State(state): State<AppState>,
    Query(params): Query<CheckedParams>,
) -> impl IntoResponse {
    let session = state.session.read().await;
    let ids = session.checked_ids(params.root.map(CategoryId));

    (StatusCode::OK, Json(CheckedResponse::new(&ids)))
}

/// One category with its selection state and subtree.
pub async fn category_handler(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let session = state.session.read().await;

    match session.require(CategoryId(id)) {
        Ok(node) => (StatusCode::OK, Json(node.clone())).into_response(),
        Err(e) => not_found(&e),
    }
}

/// Whether the children of one category disagree.
pub async fn indeterminate_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Response {
    let session = state.session.read().await;
    let id = CategoryId(id);

    match session.require(id) {
        Ok(_) => {
            let response = IndeterminateResponse {
                id: id.0,
                indeterminate: session.is_indeterminate(id),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => not_found(&e),
    }
}

fn not_found(error: &FilterError) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(error.to_string())),
    )
        .into_response()
}
