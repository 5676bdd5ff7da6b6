//! Moderation module: pending-approval queue for generated social posts
//!
//! Each post-generating agent client owns a [`PostQueue`]. Posts wait there
//! until a human approves them (dispatched through the client's
//! [`PostDispatcher`], then removed) or rejects them (removed unsent).

pub mod dispatch;
pub mod handler;
pub mod history;
pub mod poster;
pub mod queue;
pub mod service;
pub mod types;

pub use dispatch::{dispatcher_from_config, LoggingDispatcher, PostDispatcher, WebhookDispatcher};
pub use handler::{moderation_router, ModerationState};
pub use history::ModerationHistory;
pub use poster::{SocialPoster, POSTER_CAPABILITY};
pub use queue::PostQueue;
pub use service::ModerationService;
pub use types::{ModerationRecord, NewPost, PendingPost, PostKind, Resolution};
