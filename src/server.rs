use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;

use crate::agent::AgentRegistry;
use crate::handlers;
use crate::runtime::AgentRuntime;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state, injected into handlers via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub registry: AgentRegistry,
    pub runtime: AgentRuntime,
    pub idle_timeout_seconds: u64,
    pub keep_alive_interval_seconds: u64,
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState, request_timeout_seconds: u64) -> Router {
    // SSE streaming routes - no request timeout (uses idle timeout internally)
    let streaming_routes = Router::new()
        .route("/agents/{id}/chat", post(handlers::v1::chat_agent))
        .with_state(state.clone());

    // Regular API routes - with request timeout
    let api_routes = Router::new()
        .route(
            "/agents",
            get(handlers::v1::list_agents).post(handlers::v1::create_agent),
        )
        .route(
            "/agents/{id}",
            get(handlers::v1::get_agent)
                .patch(handlers::v1::update_agent)
                .delete(handlers::v1::delete_agent),
        )
        .route("/agents/{id}/tree", get(handlers::v1::get_agent_tree))
        .route(
            "/agents/{id}/delegate",
            get(handlers::v1::find_delegation_chain),
        )
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_seconds),
        ));

    let api_v1 = Router::new().merge(streaming_routes).merge(api_routes);

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .nest("/api/v1", api_v1)
}
