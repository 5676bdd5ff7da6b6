//! Social dispatch clients
//!
//! A [`PostDispatcher`] publishes approved posts. The moderation core only
//! needs the two send operations; the concrete client decides how the post
//! reaches the platform.

use crate::config::DispatchConfig;
use crate::error::{Error, Result};
use crate::moderation::types::PostKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Client able to publish replies and quotes
#[async_trait]
pub trait PostDispatcher: Send + Sync {
    /// Client name for logs
    fn name(&self) -> &str;

    /// Publish `content` as a reply to `target_id`, returning the remote post id
    async fn send_reply(&self, content: &str, target_id: &str) -> Result<String>;

    /// Publish `content` as a quote of `target_id`, returning the remote post id
    async fn send_quote(&self, content: &str, target_id: &str) -> Result<String>;
}

/// Build the dispatcher selected by configuration
pub fn dispatcher_from_config(config: &DispatchConfig) -> Result<Arc<dyn PostDispatcher>> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookDispatcher::new(
            url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(Arc::new(LoggingDispatcher)),
    }
}

/// Dispatcher that only logs approved posts
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDispatcher;

#[async_trait]
impl PostDispatcher for LoggingDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    async fn send_reply(&self, content: &str, target_id: &str) -> Result<String> {
        tracing::info!(target_id = %target_id, "Reply approved: {}", content);
        Ok(format!("log-{}", uuid::Uuid::new_v4()))
    }

    async fn send_quote(&self, content: &str, target_id: &str) -> Result<String> {
        tracing::info!(target_id = %target_id, "Quote approved: {}", content);
        Ok(format!("log-{}", uuid::Uuid::new_v4()))
    }
}

/// Webhook request body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub kind: PostKind,
    pub content: String,
    pub target_id: String,
}

#[derive(Debug, Deserialize)]
struct WebhookReply {
    id: Option<String>,
}

/// Dispatcher that forwards approved posts to an HTTP endpoint
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: String,
}

impl WebhookDispatcher {
    /// Create a webhook dispatcher with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn send(&self, kind: PostKind, content: &str, target_id: &str) -> Result<String> {
        let payload = WebhookPayload {
            kind,
            content: content.to_string(),
            target_id: target_id.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Dispatch(format!("webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Dispatch(format!("webhook returned {}", status)));
        }

        // A body is optional; fall back to a local id when the endpoint sends none
        let remote_id = response
            .json::<WebhookReply>()
            .await
            .ok()
            .and_then(|reply| reply.id)
            .unwrap_or_else(|| format!("webhook-{}", uuid::Uuid::new_v4()));

        tracing::debug!(kind = %kind, remote_id = %remote_id, "Post delivered to webhook");
        Ok(remote_id)
    }
}

#[async_trait]
impl PostDispatcher for WebhookDispatcher {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send_reply(&self, content: &str, target_id: &str) -> Result<String> {
        self.send(PostKind::Reply, content, target_id).await
    }

    async fn send_quote(&self, content: &str, target_id: &str) -> Result<String> {
        self.send(PostKind::Quote, content, target_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use tokio::sync::Mutex;

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn spawn_webhook(status: StatusCode) -> (String, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/posts",
                post(
                    move |State(received): State<Received>, Json(body): Json<serde_json::Value>| async move {
                        received.lock().await.push(body);
                        (status, Json(serde_json::json!({"id": "remote-1"})))
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/posts", addr), received)
    }

    #[tokio::test]
    async fn test_logging_dispatcher() {
        let dispatcher = LoggingDispatcher;
        let id = dispatcher.send_reply("hi", "t1").await.unwrap();
        assert!(id.starts_with("log-"));
        assert!(dispatcher.send_quote("hi", "t1").await.is_ok());
    }

    #[test]
    fn test_dispatcher_from_config() {
        let config = DispatchConfig::default();
        assert_eq!(dispatcher_from_config(&config).unwrap().name(), "log");

        let config = DispatchConfig {
            webhook_url: Some("http://127.0.0.1:1/posts".to_string()),
            timeout_secs: 5,
        };
        assert_eq!(dispatcher_from_config(&config).unwrap().name(), "webhook");
    }

    #[tokio::test]
    async fn test_webhook_dispatcher_posts_payload() {
        let (url, received) = spawn_webhook(StatusCode::OK).await;
        let dispatcher = WebhookDispatcher::new(url, Duration::from_secs(5)).unwrap();

        let id = dispatcher.send_quote("so true", "1789").await.unwrap();
        assert_eq!(id, "remote-1");

        let bodies = received.lock().await;
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["kind"], "quote");
        assert_eq!(bodies[0]["content"], "so true");
        assert_eq!(bodies[0]["targetId"], "1789");
    }

    #[tokio::test]
    async fn test_webhook_dispatcher_error_status() {
        let (url, _received) = spawn_webhook(StatusCode::SERVICE_UNAVAILABLE).await;
        let dispatcher = WebhookDispatcher::new(url, Duration::from_secs(5)).unwrap();

        let err = dispatcher.send_reply("hi", "t1").await.unwrap_err();
        assert!(matches!(err, Error::Dispatch(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_webhook_dispatcher_unreachable() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dispatcher =
            WebhookDispatcher::new(format!("http://{}/posts", addr), Duration::from_secs(2))
                .unwrap();
        let err = dispatcher.send_reply("hi", "t1").await.unwrap_err();
        assert!(matches!(err, Error::Dispatch(_)));
    }
}
