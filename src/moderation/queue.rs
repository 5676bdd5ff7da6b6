//! Per-agent pending post queue
//!
//! An insertion-ordered map from post id to [`PendingPost`]. Ids are fresh
//! UUIDs, so an id that has left the queue is never handed out again, not
//! even by a queue created for a restarted agent under the same identity.

use crate::moderation::types::{NewPost, PendingPost};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

/// Pending posts of one agent, awaiting approval
#[derive(Default)]
pub struct PostQueue {
    /// Insertion order: front = oldest
    posts: RwLock<Vec<PendingPost>>,
    /// Held across lookup, dispatch and removal of a post
    resolution: Mutex<()>,
}

impl PostQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a post and return its fresh id
    pub async fn enqueue(&self, post: NewPost) -> String {
        let id = Uuid::new_v4().to_string();
        let pending = PendingPost {
            id: id.clone(),
            kind: post.kind,
            content: post.content,
            target_id: post.target_id,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.posts.write().await.push(pending);
        id
    }

    /// Snapshot of all pending posts, oldest first
    pub async fn list(&self) -> Vec<PendingPost> {
        self.posts.read().await.clone()
    }

    /// Look up a pending post
    pub async fn get(&self, id: &str) -> Option<PendingPost> {
        self.posts.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// Remove a post, returning it if it was still pending
    pub async fn remove(&self, id: &str) -> Option<PendingPost> {
        let mut posts = self.posts.write().await;
        let index = posts.iter().position(|p| p.id == id)?;
        Some(posts.remove(index))
    }

    /// Drop every pending post, returning how many were discarded
    pub async fn clear(&self) -> usize {
        let mut posts = self.posts.write().await;
        let count = posts.len();
        posts.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }

    /// Enter the queue's exclusive resolution section.
    ///
    /// Approve and reject hold this guard from lookup until removal so a post
    /// is dispatched at most once.
    pub async fn lock_resolution(&self) -> MutexGuard<'_, ()> {
        self.resolution.lock().await
    }
}
