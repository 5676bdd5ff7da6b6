//! Unified API router for Postwarden
//!
//! Merges the module routers into a single axum `Router` with CORS, request
//! tracing and a request body limit.
//!
//! ## Endpoint Map
//!
//! | Path                                    | Module     | Description                 |
//! |-----------------------------------------|------------|-----------------------------|
//! | `/`, `/hello`, `/health`                | api        | Welcome and health probes   |
//! | `/agents`, `/agents/:id[/set,/channels]`| agent      | Agent lifecycle             |
//! | `/agents/:id/pending-tweets`            | moderation | Pending posts, submission   |
//! | `/agents/:id/approve-tweet/:tweetId`    | moderation | Approve and publish a post  |
//! | `/agents/:id/reject-tweet/:tweetId`     | moderation | Reject a post               |
//! | `/agents/:id/tweet-history`             | moderation | Resolved posts              |

use crate::agent::{agent_router, AgentState};
use crate::moderation::{moderation_router, ModerationState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Postwarden HTTP application
pub fn build_app(
    agent_state: AgentState,
    moderation_state: ModerationState,
    cors_origins: &[String],
    max_payload_bytes: usize,
) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/hello", get(hello))
        .route("/health", get(health_check))
        .merge(agent_router(agent_state))
        .merge(moderation_router(moderation_state))
        .layer(DefaultBodyLimit::max(max_payload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(cors_origins))
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct HelloResponse {
    message: String,
}

async fn welcome() -> &'static str {
    "Welcome, this is the REST API!"
}

async fn hello() -> impl IntoResponse {
    Json(HelloResponse {
        message: "Hello World!".to_string(),
    })
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin: {}", e);
                    None
                }
            })
            .collect();
        cors.allow_origin(parsed)
    }
}
