//! Moderation wire types

use serde::{Deserialize, Serialize};

/// Kind of outbound post, which selects the dispatch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    /// Reply to the target message
    Reply,
    /// Quote of the target message
    Quote,
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostKind::Reply => write!(f, "reply"),
            PostKind::Quote => write!(f, "quote"),
        }
    }
}

/// A generated post before it enters a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub kind: PostKind,
    pub content: String,
    /// Id of the message being replied to or quoted
    pub target_id: String,
}

impl NewPost {
    pub fn reply(content: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            kind: PostKind::Reply,
            content: content.into(),
            target_id: target_id.into(),
        }
    }

    pub fn quote(content: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            kind: PostKind::Quote,
            content: content.into(),
            target_id: target_id.into(),
        }
    }
}

/// A generated post awaiting human review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPost {
    pub id: String,
    pub kind: PostKind,
    pub content: String,
    pub target_id: String,
    /// Enqueue timestamp (ms)
    pub created_at: i64,
}

/// Terminal state of a moderated post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Sent,
    Rejected,
}

/// Audit record for a post that left the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRecord {
    pub agent_id: String,
    pub post: PendingPost,
    pub resolution: Resolution,
    /// Id returned by the social client, for sent posts
    pub remote_id: Option<String>,
    pub resolved_at: i64,
}
