//! HTTP handlers for the agent lifecycle API
//!
//! - GET    /agents                    running agents
//! - GET    /agents/:agentId           identity and character snapshot
//! - POST   /agents/:agentId/set       replace (or start) an agent from a character
//! - DELETE /agents/:agentId           stop an agent
//! - GET    /agents/:agentId/channels  enabled clients of an agent

use crate::agent::registry::AgentRegistry;
use crate::agent::types::{AgentDetail, AgentSummary};
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for agent handlers
#[derive(Clone)]
pub struct AgentState {
    pub registry: Arc<AgentRegistry>,
}

/// Create the agent router
pub fn agent_router(state: AgentState) -> Router {
    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/:agent_id", get(get_agent).delete(stop_agent))
        .route("/agents/:agent_id/set", post(set_agent))
        .route("/agents/:agent_id/channels", get(list_channels))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct AgentsResponse {
    agents: Vec<AgentSummary>,
}

#[derive(Debug, Serialize)]
struct ChannelsResponse {
    id: String,
    channels: Vec<String>,
}

/// GET /agents
async fn list_agents(State(state): State<AgentState>) -> impl IntoResponse {
    Json(AgentsResponse {
        agents: state.registry.list().await,
    })
}

/// GET /agents/:agentId
async fn get_agent(
    State(state): State<AgentState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentDetail>, Error> {
    match state.registry.get(&agent_id).await {
        Some(handle) => Ok(Json(handle.detail())),
        None => Err(Error::AgentNotFound(agent_id)),
    }
}

/// POST /agents/:agentId/set
///
/// Stops the agent currently at `agentId` (if any), then starts the posted
/// character. A renamed character comes back under its new identity.
async fn set_agent(
    State(state): State<AgentState>,
    Path(agent_id): Path<String>,
    Json(character): Json<serde_json::Value>,
) -> Result<Json<AgentDetail>, Error> {
    let handle = state.registry.replace(&agent_id, &character).await?;
    Ok(Json(handle.detail()))
}

/// DELETE /agents/:agentId
async fn stop_agent(
    State(state): State<AgentState>,
    Path(agent_id): Path<String>,
) -> impl IntoResponse {
    if !state.registry.stop_identity(&agent_id).await {
        tracing::debug!(agent_id = %agent_id, "Stop requested for agent that is not running");
    }
    StatusCode::NO_CONTENT
}

/// GET /agents/:agentId/channels
async fn list_channels(
    State(state): State<AgentState>,
    Path(agent_id): Path<String>,
) -> Result<Json<ChannelsResponse>, Error> {
    let handle = state
        .registry
        .get(&agent_id)
        .await
        .ok_or_else(|| Error::AgentNotFound(agent_id.clone()))?;
    Ok(Json(ChannelsResponse {
        id: handle.id.clone(),
        channels: handle.capability_names(),
    }))
}
