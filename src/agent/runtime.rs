//! Agent runtime factory
//!
//! The registry never builds agents itself; it asks an [`AgentRuntime`] to
//! validate a character, start an instance and terminate it again.

use crate::agent::types::{AgentHandle, Capability, CharacterConfig};
use crate::agent::validate::validate_character_config;
use crate::error::Result;
use crate::moderation::{PostDispatcher, SocialPoster, POSTER_CAPABILITY};
use async_trait::async_trait;
use std::sync::Arc;

/// Factory that turns character configurations into running agents
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Check a raw character payload against the configuration schema
    fn validate(&self, raw: &serde_json::Value) -> Result<CharacterConfig> {
        validate_character_config(raw)
    }

    /// Start an agent; failures surface as `Error::Start`
    async fn start(&self, character: CharacterConfig) -> Result<AgentHandle>;

    /// Signal a running agent to terminate. Never fails observably.
    async fn terminate(&self, handle: &AgentHandle);
}

/// In-process runtime.
///
/// A `twitter` client becomes a [`SocialPoster`] whose approved posts go
/// through the shared dispatcher; every other client is passive.
pub struct LocalRuntime {
    dispatcher: Arc<dyn PostDispatcher>,
}

impl LocalRuntime {
    pub fn new(dispatcher: Arc<dyn PostDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl AgentRuntime for LocalRuntime {
    async fn start(&self, character: CharacterConfig) -> Result<AgentHandle> {
        let capabilities = character
            .clients()
            .iter()
            .map(|name| {
                if name == POSTER_CAPABILITY {
                    Capability::Poster {
                        name: name.clone(),
                        poster: Arc::new(SocialPoster::new(self.dispatcher.clone())),
                    }
                } else {
                    Capability::Passive { name: name.clone() }
                }
            })
            .collect();

        let handle = AgentHandle::new(character, capabilities);
        tracing::debug!(
            agent_id = %handle.id,
            clients = ?handle.capability_names(),
            dispatcher = self.dispatcher.name(),
            "Agent runtime started"
        );
        Ok(handle)
    }

    async fn terminate(&self, handle: &AgentHandle) {
        if let Some(poster) = handle.poster() {
            let discarded = poster.queue().clear().await;
            if discarded > 0 {
                tracing::info!(
                    agent_id = %handle.id,
                    discarded,
                    "Discarded pending posts of stopped agent"
                );
            }
        }
        tracing::debug!(agent_id = %handle.id, "Agent runtime terminated");
    }
}
