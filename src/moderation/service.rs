//! Moderation service
//!
//! Resolves an agent's post queue through the registry and applies the
//! per-post state machine:
//!
//! ```text
//! pending --approve (dispatch ok)-----> sent      (removed)
//! pending --approve (dispatch failed)-> pending   (unchanged)
//! pending --reject--------------------> rejected  (removed)
//! ```
//!
//! A post is removed only after its dispatch succeeded, and the lookup,
//! dispatch and removal run inside the queue's resolution section, so two
//! racing approvals publish a post at most once.

use crate::agent::{AgentHandle, AgentRegistry};
use crate::error::{Error, Result};
use crate::moderation::history::ModerationHistory;
use crate::moderation::poster::{SocialPoster, POSTER_CAPABILITY};
use crate::moderation::types::{ModerationRecord, NewPost, PendingPost, Resolution};
use std::sync::Arc;

/// Approve/reject front end over the agents' post queues
pub struct ModerationService {
    registry: Arc<AgentRegistry>,
    history: ModerationHistory,
}

impl ModerationService {
    pub fn new(registry: Arc<AgentRegistry>, history: ModerationHistory) -> Self {
        Self { registry, history }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Pending posts of an agent, oldest first
    pub async fn list_pending(&self, agent_id: &str) -> Result<Vec<PendingPost>> {
        let (_, poster) = self.resolve(agent_id).await?;
        Ok(poster.queue().list().await)
    }

    /// Queue a generated post for review, returning its id
    pub async fn submit(&self, agent_id: &str, post: NewPost) -> Result<String> {
        let (_, poster) = self.resolve(agent_id).await?;
        let kind = post.kind;
        let id = poster.queue().enqueue(post).await;
        tracing::debug!(agent_id = %agent_id, post_id = %id, kind = %kind, "Post queued for approval");
        Ok(id)
    }

    /// Publish a pending post and remove it from the queue.
    ///
    /// On dispatch failure the post stays pending and `Error::Dispatch` is
    /// returned, so the approval can be retried.
    pub async fn approve(&self, agent_id: &str, post_id: &str) -> Result<ModerationRecord> {
        let (agent, poster) = self.resolve(agent_id).await?;
        let queue = poster.queue();

        let _resolution = queue.lock_resolution().await;
        let post = queue
            .get(post_id)
            .await
            .ok_or_else(|| Error::PostNotFound(post_id.to_string()))?;

        let remote_id = match poster.dispatch(&post).await {
            Ok(remote_id) => remote_id,
            Err(e) => {
                tracing::warn!(
                    agent_id = %agent.id,
                    post_id = %post_id,
                    kind = %post.kind,
                    "Failed to send post: {}",
                    e
                );
                return Err(match e {
                    Error::Dispatch(message) => Error::Dispatch(message),
                    other => Error::Dispatch(other.to_string()),
                });
            }
        };

        queue.remove(post_id).await;
        tracing::info!(
            agent_id = %agent.id,
            post_id = %post_id,
            kind = %post.kind,
            remote_id = %remote_id,
            "Post approved and sent"
        );

        let record = self.record(&agent, post, Resolution::Sent, Some(remote_id));
        self.history.record(record.clone()).await;
        Ok(record)
    }

    /// Drop a pending post without publishing it
    pub async fn reject(&self, agent_id: &str, post_id: &str) -> Result<ModerationRecord> {
        let (agent, poster) = self.resolve(agent_id).await?;
        let queue = poster.queue();

        let _resolution = queue.lock_resolution().await;
        let post = queue
            .remove(post_id)
            .await
            .ok_or_else(|| Error::PostNotFound(post_id.to_string()))?;

        tracing::info!(agent_id = %agent.id, post_id = %post_id, kind = %post.kind, "Post rejected");

        let record = self.record(&agent, post, Resolution::Rejected, None);
        self.history.record(record.clone()).await;
        Ok(record)
    }

    /// Resolved posts of an agent, oldest first.
    ///
    /// Records outlive the agent, so no registry lookup is made.
    pub async fn history(&self, agent_id: &str) -> Vec<ModerationRecord> {
        self.history.for_agent(agent_id).await
    }

    async fn resolve(&self, agent_id: &str) -> Result<(Arc<AgentHandle>, Arc<SocialPoster>)> {
        let agent = self
            .registry
            .get(agent_id)
            .await
            .ok_or_else(|| Error::AgentNotFound(agent_id.to_string()))?;
        let poster = agent.poster().ok_or_else(|| Error::CapabilityUnavailable {
            agent: agent_id.to_string(),
            capability: POSTER_CAPABILITY.to_string(),
        })?;
        Ok((agent, poster))
    }

    fn record(
        &self,
        agent: &AgentHandle,
        post: PendingPost,
        resolution: Resolution,
        remote_id: Option<String>,
    ) -> ModerationRecord {
        ModerationRecord {
            agent_id: agent.id.clone(),
            post,
            resolution,
            remote_id,
            resolved_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::LocalRuntime;
    use crate::moderation::PostDispatcher;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Dispatcher that records calls, can be told to fail, and can be slowed down
    #[derive(Default)]
    pub(crate) struct RecordingDispatcher {
        pub calls: Mutex<Vec<(String, String, String)>>,
        pub count: AtomicUsize,
        pub fail: AtomicBool,
        pub delay_ms: u64,
    }

    impl RecordingDispatcher {
        pub fn slow(delay_ms: u64) -> Self {
            Self {
                delay_ms,
                ..Self::default()
            }
        }

        async fn send(&self, kind: &str, content: &str, target_id: &str) -> Result<String> {
            self.count.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Dispatch("rate limited".to_string()));
            }
            self.calls
                .lock()
                .await
                .push((kind.to_string(), content.to_string(), target_id.to_string()));
            Ok(format!("remote-{}", self.count.load(Ordering::SeqCst)))
        }
    }

    #[async_trait]
    impl PostDispatcher for RecordingDispatcher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send_reply(&self, content: &str, target_id: &str) -> Result<String> {
            self.send("reply", content, target_id).await
        }

        async fn send_quote(&self, content: &str, target_id: &str) -> Result<String> {
            self.send("quote", content, target_id).await
        }
    }

    pub(crate) async fn setup(
        dispatcher: Arc<RecordingDispatcher>,
    ) -> (Arc<ModerationService>, String) {
        let registry = Arc::new(AgentRegistry::new(Arc::new(LocalRuntime::new(dispatcher))));
        let agent = registry
            .start(&json!({
                "name": "Eliza",
                "bio": "bio",
                "modelProvider": "openai",
                "clients": ["twitter"]
            }))
            .await
            .unwrap();
        let service = Arc::new(ModerationService::new(registry, ModerationHistory::new(100)));
        (service, agent.id.clone())
    }

    #[tokio::test]
    async fn test_approve_reply_dispatches_once() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (service, agent_id) = setup(dispatcher.clone()).await;

        let p1 = service.submit(&agent_id, NewPost::reply("hi", "t1")).await.unwrap();
        let record = service.approve(&agent_id, &p1).await.unwrap();

        assert_eq!(record.resolution, Resolution::Sent);
        assert_eq!(record.remote_id.as_deref(), Some("remote-1"));
        assert!(service.list_pending(&agent_id).await.unwrap().is_empty());
        assert_eq!(
            *dispatcher.calls.lock().await,
            vec![("reply".to_string(), "hi".to_string(), "t1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_approve_quote_uses_quote_operation() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (service, agent_id) = setup(dispatcher.clone()).await;

        let id = service.submit(&agent_id, NewPost::quote("so true", "t9")).await.unwrap();
        service.approve(&agent_id, &id).await.unwrap();

        let calls = dispatcher.calls.lock().await;
        assert_eq!(calls[0].0, "quote");
        assert_eq!(calls[0].2, "t9");
    }

    #[tokio::test]
    async fn test_second_approve_is_post_not_found() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (service, agent_id) = setup(dispatcher.clone()).await;

        let id = service.submit(&agent_id, NewPost::reply("hi", "t1")).await.unwrap();
        service.approve(&agent_id, &id).await.unwrap();

        assert!(matches!(
            service.approve(&agent_id, &id).await,
            Err(Error::PostNotFound(_))
        ));
        assert!(matches!(
            service.reject(&agent_id, &id).await,
            Err(Error::PostNotFound(_))
        ));
        assert_eq!(dispatcher.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_keeps_post() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        dispatcher.fail.store(true, Ordering::SeqCst);
        let (service, agent_id) = setup(dispatcher.clone()).await;

        let id = service.submit(&agent_id, NewPost::reply("hi", "t1")).await.unwrap();
        let before = service.list_pending(&agent_id).await.unwrap();

        let err = service.approve(&agent_id, &id).await.unwrap_err();
        assert!(matches!(err, Error::Dispatch(ref m) if m.contains("rate limited")));
        assert_eq!(service.list_pending(&agent_id).await.unwrap(), before);

        // Retry once the client recovers
        dispatcher.fail.store(false, Ordering::SeqCst);
        service.approve(&agent_id, &id).await.unwrap();
        assert!(service.list_pending(&agent_id).await.unwrap().is_empty());
        assert_eq!(dispatcher.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_approve_unknown_post() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (service, agent_id) = setup(dispatcher.clone()).await;
        service.submit(&agent_id, NewPost::reply("hi", "t1")).await.unwrap();

        let err = service.approve(&agent_id, "unknown").await.unwrap_err();
        assert!(matches!(err, Error::PostNotFound(ref id) if id == "unknown"));
        assert_eq!(service.list_pending(&agent_id).await.unwrap().len(), 1);
        assert_eq!(dispatcher.count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let (service, _) = setup(Arc::new(RecordingDispatcher::default())).await;
        assert!(matches!(
            service.list_pending("ghost").await,
            Err(Error::AgentNotFound(_))
        ));
        assert!(matches!(
            service.approve("ghost", "p1").await,
            Err(Error::AgentNotFound(_))
        ));
        assert!(matches!(
            service.reject("ghost", "p1").await,
            Err(Error::AgentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_agent_without_poster() {
        let (service, _) = setup(Arc::new(RecordingDispatcher::default())).await;
        let quiet = service
            .registry()
            .start(&json!({"name": "Quiet", "bio": "b", "modelProvider": "openai", "clients": ["direct"]}))
            .await
            .unwrap();

        assert!(matches!(
            service.list_pending(&quiet.id).await,
            Err(Error::CapabilityUnavailable { .. })
        ));
        assert!(matches!(
            service.approve(&quiet.id, "p1").await,
            Err(Error::CapabilityUnavailable { .. })
        ));
        assert!(matches!(
            service.submit(&quiet.id, NewPost::reply("x", "t")).await,
            Err(Error::CapabilityUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_reject_removes_without_dispatch() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (service, agent_id) = setup(dispatcher.clone()).await;

        let id = service.submit(&agent_id, NewPost::reply("hi", "t1")).await.unwrap();
        let record = service.reject(&agent_id, &id).await.unwrap();

        assert_eq!(record.resolution, Resolution::Rejected);
        assert!(record.remote_id.is_none());
        assert!(service.list_pending(&agent_id).await.unwrap().is_empty());
        assert_eq!(dispatcher.count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_approvals_dispatch_once() {
        let dispatcher = Arc::new(RecordingDispatcher::slow(50));
        let (service, agent_id) = setup(dispatcher.clone()).await;
        let id = service.submit(&agent_id, NewPost::reply("hi", "t1")).await.unwrap();

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let service = service.clone();
                let agent_id = agent_id.clone();
                let id = id.clone();
                tokio::spawn(async move { service.approve(&agent_id, &id).await })
            })
            .collect();

        let results: Vec<Result<ModerationRecord>> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, Error::PostNotFound(_))));
        assert_eq!(dispatcher.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reject_racing_approve() {
        let dispatcher = Arc::new(RecordingDispatcher::slow(50));
        let (service, agent_id) = setup(dispatcher.clone()).await;
        let id = service.submit(&agent_id, NewPost::reply("hi", "t1")).await.unwrap();

        let approve = {
            let service = service.clone();
            let agent_id = agent_id.clone();
            let id = id.clone();
            tokio::spawn(async move { service.approve(&agent_id, &id).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let rejected = service.reject(&agent_id, &id).await;

        assert!(approve.await.unwrap().is_ok());
        assert!(matches!(rejected, Err(Error::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_history_records_terminal_transitions() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (service, agent_id) = setup(dispatcher).await;

        let sent = service.submit(&agent_id, NewPost::reply("a", "t1")).await.unwrap();
        let dropped = service.submit(&agent_id, NewPost::quote("b", "t2")).await.unwrap();
        service.approve(&agent_id, &sent).await.unwrap();
        service.reject(&agent_id, &dropped).await.unwrap();

        let history = service.history(&agent_id).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].post.id, sent);
        assert_eq!(history[0].resolution, Resolution::Sent);
        assert_eq!(history[1].post.id, dropped);
        assert_eq!(history[1].resolution, Resolution::Rejected);
    }

    #[tokio::test]
    async fn test_stopping_agent_discards_queue() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (service, agent_id) = setup(dispatcher).await;
        let id = service.submit(&agent_id, NewPost::reply("a", "t1")).await.unwrap();

        let agent = service.registry().get(&agent_id).await.unwrap();
        let poster = agent.poster().unwrap();
        service.registry().stop(&agent).await;

        assert!(poster.queue().get(&id).await.is_none());
        assert!(matches!(
            service.approve(&agent_id, &id).await,
            Err(Error::AgentNotFound(_))
        ));
    }
}
