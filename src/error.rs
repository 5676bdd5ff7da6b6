//! Postwarden error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Postwarden error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed character configuration
    #[error("Invalid character configuration: {0}")]
    Validation(String),

    /// Runtime factory failed to start an agent
    #[error("Failed to start agent: {0}")]
    Start(String),

    /// An agent is already registered under the identity
    #[error("Agent '{0}' is already running")]
    AlreadyRunning(String),

    /// The social client failed to publish a post
    #[error("Failed to send post: {0}")]
    Dispatch(String),

    /// No agent registered under the identity
    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    /// The agent has no active capability of the requested kind
    #[error("Agent '{agent}' has no active '{capability}' client")]
    CapabilityUnavailable { agent: String, capability: String },

    /// No pending post with the id
    #[error("Post '{0}' not found")]
    PostNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Start(_) => "START_FAILED",
            Error::AlreadyRunning(_) => "ALREADY_RUNNING",
            Error::Dispatch(_) => "DISPATCH_FAILED",
            Error::AgentNotFound(_) => "AGENT_NOT_FOUND",
            Error::CapabilityUnavailable { .. } => "CAPABILITY_UNAVAILABLE",
            Error::PostNotFound(_) => "POST_NOT_FOUND",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) | Error::Http(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the transport layer reports for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::AgentNotFound(_)
            | Error::CapabilityUnavailable { .. }
            | Error::PostNotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyRunning(_) => StatusCode::CONFLICT,
            Error::Start(_) | Error::Dispatch(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_) | Error::Io(_) | Error::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        Self {
            error: ApiErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.code(), "Request failed: {}", self);
        }
        (status, Json(ApiError::from(&self))).into_response()
    }
}

/// Result type alias for Postwarden operations
pub type Result<T> = std::result::Result<T, Error>;
