//! # treefilter HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//! One filter session is hosted per server process.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /session` - Session summary
//! - `POST /selection` - Set selected item and active category
//! - `POST /clear` - Clear every filter
//! - `GET /tree` - Full selection tree
//! - `POST /tree` - Merge a raw category tree
//! - `POST /toggle` - Check or uncheck a category
//! - `GET /checked` - Checked category ids (`?root=ID` for one subtree)
//! - `GET /categories/{id}` - One category
//! - `GET /categories/{id}/indeterminate` - Indeterminate flag of a category

mod auth;
mod handlers;
mod types;

pub use auth::{ApiKey, key_matches};
pub use handlers::{
    category_handler, checked_handler, clear_handler, health_handler, indeterminate_handler,
    merge_handler, selection_handler, session_handler, toggle_handler, tree_handler,
};
pub use types::{
    CheckedParams, CheckedResponse, ErrorResponse, HealthResponse, IndeterminateResponse,
    MergeResponse, SelectionRequest, SessionResponse, ToggleRequest, ToggleResponse, TreeResponse,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use treefilter_core::{FilterError, FilterSession};

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the filter session.
#[derive(Clone)]
pub struct AppState {
    /// The hosted session. Every mutation holds the write lock.
    pub session: Arc<RwLock<FilterSession>>,
}

impl AppState {
    /// Create new app state with a session.
    #[must_use]
    pub fn new(session: FilterSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - `["*"]`: allows all origins
/// - empty: localhost only
/// - otherwise: the listed origins (invalid entries are skipped)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        tracing::info!("CORS: No valid origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/session", get(handlers::session_handler))
        .route("/selection", post(handlers::selection_handler))
        .route("/clear", post(handlers::clear_handler))
        .route(
            "/tree",
            get(handlers::tree_handler).post(handlers::merge_handler),
        )
        .route("/toggle", post(handlers::toggle_handler))
        .route("/checked", get(handlers::checked_handler))
        .route("/categories/{id}", get(handlers::category_handler))
        .route(
            "/categories/{id}/indeterminate",
            get(handlers::indeterminate_handler),
        );

    match server.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            let key: ApiKey = Arc::from(key);
            router = router.layer(axum_middleware::from_fn_with_state(
                key,
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "API key authentication DISABLED - all endpoints are publicly accessible! \
                 Set TREEFILTER_API_KEY or server.api_key to enable authentication."
            );
        }
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(&server.cors_origins))
                .layer(axum::extract::DefaultBodyLimit::max(server.body_limit)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(server: &ServerConfig, session: FilterSession) -> Result<(), FilterError> {
    let addr = format!("{}:{}", server.host, server.port);
    let router = create_router(AppState::new(session), server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FilterError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("treefilter HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FilterError::Io(format!("Server error: {}", e)))
}

/// Resolve on Ctrl+C. Never resolves if the signal handler cannot be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
