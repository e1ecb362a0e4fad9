//! Agent registry HTTP handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentPatch, AgentRecord, CreateAgent, RegistryError};
use crate::response;
use crate::server::AppState;

#[derive(Serialize)]
pub struct ListAgentsResponse {
    pub agents: Vec<AgentRecord>,
}

#[derive(Deserialize)]
pub struct DelegateQuery {
    pub task_type: String,
}

#[derive(Serialize)]
pub struct DelegationChainResponse {
    pub chain: Vec<String>,
}

/// Map a registry error to an HTTP response.
fn registry_error(e: RegistryError) -> Response {
    match e {
        RegistryError::NotFound { id } => {
            response::not_found(format!("Agent '{id}' not found")).into_response()
        }
        RegistryError::Validation(message) => response::bad_request(message).into_response(),
        RegistryError::Storage(e) => {
            tracing::error!(error = %e, "Registry storage failure");
            response::internal_error("Registry storage failure").into_response()
        }
    }
}

/// GET /api/v1/agents
pub async fn list_agents(State(state): State<AppState>) -> Response {
    match state.registry.list().await {
        Ok(agents) => Json(ListAgentsResponse { agents }).into_response(),
        Err(e) => registry_error(e),
    }
}

/// POST /api/v1/agents
pub async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<CreateAgent>,
) -> Response {
    match state.registry.create(req).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => registry_error(e),
    }
}

/// GET /api/v1/agents/{id}
pub async fn get_agent(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.registry.get(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => registry_error(e),
    }
}

/// PATCH /api/v1/agents/{id}
pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<AgentPatch>,
) -> Response {
    match state.registry.update(&id, patch).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => registry_error(e),
    }
}

/// DELETE /api/v1/agents/{id}
///
/// Removal maps to 204; a missing record maps to 404 at the transport layer
/// even though the registry reports it as a plain `false`.
pub async fn delete_agent(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.registry.delete(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => response::not_found(format!("Agent '{id}' not found")).into_response(),
        Err(e) => registry_error(e),
    }
}

/// GET /api/v1/agents/{id}/tree
pub async fn get_agent_tree(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.registry.build_tree(&id).await {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => registry_error(e),
    }
}

/// GET /api/v1/agents/{id}/delegate?task_type=X
pub async fn find_delegation_chain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DelegateQuery>,
) -> Response {
    match state.registry.find_delegation_chain(&query.task_type, &id).await {
        Ok(chain) => Json(DelegationChainResponse { chain }).into_response(),
        Err(e) => registry_error(e),
    }
}
