//! HTTP handlers for the moderation API
//!
//! - GET  /agents/:agentId/pending-tweets              pending posts
//! - POST /agents/:agentId/pending-tweets              submit a generated post
//! - POST /agents/:agentId/approve-tweet/:tweetId      publish a pending post
//! - POST /agents/:agentId/reject-tweet/:tweetId       drop a pending post
//! - GET  /agents/:agentId/tweet-history               resolved posts

use crate::error::Error;
use crate::moderation::service::ModerationService;
use crate::moderation::types::{ModerationRecord, NewPost, PendingPost};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for moderation handlers
#[derive(Clone)]
pub struct ModerationState {
    pub service: Arc<ModerationService>,
}

/// Create the moderation router
pub fn moderation_router(state: ModerationState) -> Router {
    Router::new()
        .route(
            "/agents/:agent_id/pending-tweets",
            get(list_pending).post(submit_post),
        )
        .route(
            "/agents/:agent_id/approve-tweet/:tweet_id",
            post(approve_post),
        )
        .route("/agents/:agent_id/reject-tweet/:tweet_id", post(reject_post))
        .route("/agents/:agent_id/tweet-history", get(post_history))
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PendingPostsResponse {
    pending_tweets: Vec<PendingPost>,
}

#[derive(Debug, Serialize)]
struct SubmittedResponse {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    id: String,
    history: Vec<ModerationRecord>,
}

/// GET /agents/:agentId/pending-tweets
async fn list_pending(
    State(state): State<ModerationState>,
    Path(agent_id): Path<String>,
) -> Result<Json<PendingPostsResponse>, Error> {
    let pending_tweets = state.service.list_pending(&agent_id).await?;
    Ok(Json(PendingPostsResponse { pending_tweets }))
}

/// POST /agents/:agentId/pending-tweets
async fn submit_post(
    State(state): State<ModerationState>,
    Path(agent_id): Path<String>,
    Json(post): Json<NewPost>,
) -> Result<impl IntoResponse, Error> {
    let id = state.service.submit(&agent_id, post).await?;
    Ok((StatusCode::CREATED, Json(SubmittedResponse { id })))
}

/// POST /agents/:agentId/approve-tweet/:tweetId
async fn approve_post(
    State(state): State<ModerationState>,
    Path((agent_id, tweet_id)): Path<(String, String)>,
) -> Result<Json<ResolvedResponse>, Error> {
    let record = state.service.approve(&agent_id, &tweet_id).await?;
    Ok(Json(ResolvedResponse {
        success: true,
        remote_id: record.remote_id,
    }))
}

/// POST /agents/:agentId/reject-tweet/:tweetId
async fn reject_post(
    State(state): State<ModerationState>,
    Path((agent_id, tweet_id)): Path<(String, String)>,
) -> Result<Json<ResolvedResponse>, Error> {
    state.service.reject(&agent_id, &tweet_id).await?;
    Ok(Json(ResolvedResponse {
        success: true,
        remote_id: None,
    }))
}

/// GET /agents/:agentId/tweet-history
async fn post_history(
    State(state): State<ModerationState>,
    Path(agent_id): Path<String>,
) -> impl IntoResponse {
    let history = state.service.history(&agent_id).await;
    Json(HistoryResponse {
        id: agent_id,
        history,
    })
}
