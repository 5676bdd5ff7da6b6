//! Agent types: character configuration, running handles and their capabilities

use crate::moderation::SocialPoster;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Character biography, either a single text or a list of lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bio {
    Text(String),
    Lines(Vec<String>),
}

impl Bio {
    /// True when there is no non-blank biography content
    pub fn is_blank(&self) -> bool {
        match self {
            Bio::Text(text) => text.trim().is_empty(),
            Bio::Lines(lines) => lines.iter().all(|l| l.trim().is_empty()),
        }
    }
}

/// Character definition an agent is started from.
///
/// Optional fields stay absent when the caller omitted them and fields this
/// crate does not interpret are kept in `extra`, so the snapshot returned to
/// callers matches what they submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub bio: Bio,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<Vec<String>>,
    /// Enabled client capabilities, e.g. "twitter"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<String>>,
    pub model_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjectives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CharacterConfig {
    /// Configured client names; empty when the character lists none
    pub fn clients(&self) -> &[String] {
        self.clients.as_deref().unwrap_or_default()
    }

    /// Identity of the agent started from this character.
    ///
    /// An explicit `id` wins; otherwise the identity is a name-based UUIDv5,
    /// so renaming a character moves it to a new identity.
    pub fn agent_id(&self) -> String {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v5(&Uuid::NAMESPACE_OID, self.name.trim().as_bytes()).to_string(),
        }
    }
}

/// Optional subsystem enabled on an agent
pub enum Capability {
    /// Social client that generates posts into a moderation queue
    Poster {
        name: String,
        poster: Arc<SocialPoster>,
    },
    /// Client without a moderation queue
    Passive { name: String },
}

impl Capability {
    pub fn name(&self) -> &str {
        match self {
            Capability::Poster { name, .. } | Capability::Passive { name } => name,
        }
    }
}

/// A running agent instance
pub struct AgentHandle {
    pub id: String,
    pub name: String,
    pub character: CharacterConfig,
    /// Start timestamp (ms)
    pub started_at: i64,
    capabilities: Vec<Capability>,
    stopped: AtomicBool,
}

impl AgentHandle {
    /// Create a handle; identity and display name come from the character
    pub fn new(character: CharacterConfig, capabilities: Vec<Capability>) -> Self {
        Self {
            id: character.agent_id(),
            name: character.name.clone(),
            character,
            started_at: chrono::Utc::now().timestamp_millis(),
            capabilities,
            stopped: AtomicBool::new(false),
        }
    }

    /// Names of the enabled capabilities, in configuration order
    pub fn capability_names(&self) -> Vec<String> {
        self.capabilities
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// The agent's post-generating client, if one is active
    pub fn poster(&self) -> Option<Arc<SocialPoster>> {
        self.capabilities.iter().find_map(|c| match c {
            Capability::Poster { poster, .. } => Some(poster.clone()),
            Capability::Passive { .. } => None,
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Flip to stopped; returns false if the handle was already stopped
    pub(crate) fn mark_stopped(&self) -> bool {
        !self.stopped.swap(true, Ordering::AcqRel)
    }

    pub fn summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            clients: self.capability_names(),
        }
    }

    pub fn detail(&self) -> AgentDetail {
        AgentDetail {
            id: self.id.clone(),
            started_at: self.started_at,
            character: self.character.clone(),
        }
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capabilities", &self.capability_names())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Listing entry for a running agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub clients: Vec<String>,
}

/// Identity plus configuration snapshot of a running agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    pub id: String,
    /// Start timestamp (ms)
    pub started_at: i64,
    pub character: CharacterConfig,
}
