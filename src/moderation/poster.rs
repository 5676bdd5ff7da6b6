//! Post-generating agent capability

use crate::error::Result;
use crate::moderation::dispatch::PostDispatcher;
use crate::moderation::queue::PostQueue;
use crate::moderation::types::{PendingPost, PostKind};
use std::sync::Arc;

/// Capability name of the social poster
pub const POSTER_CAPABILITY: &str = "twitter";

/// Social client of one agent: its pending queue plus the client that publishes
pub struct SocialPoster {
    queue: PostQueue,
    dispatcher: Arc<dyn PostDispatcher>,
}

impl SocialPoster {
    pub fn new(dispatcher: Arc<dyn PostDispatcher>) -> Self {
        Self {
            queue: PostQueue::new(),
            dispatcher,
        }
    }

    /// Posts awaiting approval
    pub fn queue(&self) -> &PostQueue {
        &self.queue
    }

    /// Publish a post through the operation matching its kind
    pub async fn dispatch(&self, post: &PendingPost) -> Result<String> {
        match post.kind {
            PostKind::Reply => {
                self.dispatcher
                    .send_reply(&post.content, &post.target_id)
                    .await
            }
            PostKind::Quote => {
                self.dispatcher
                    .send_quote(&post.content, &post.target_id)
                    .await
            }
        }
    }
}
