//! Agent lifecycle registry
//!
//! Maps agent identity to the running [`AgentHandle`]. Start, stop and
//! replace hold a lock per affected identity, so the stop and start halves of
//! a replace never interleave with another lifecycle change on the same
//! identity while unrelated agents proceed independently. A replace that
//! moves an agent to a new identity holds both locks, taken in sorted order.

use crate::agent::runtime::AgentRuntime;
use crate::agent::types::{AgentHandle, AgentSummary, CharacterConfig};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Registry of running agents
pub struct AgentRegistry {
    runtime: Arc<dyn AgentRuntime>,
    agents: Arc<RwLock<HashMap<String, Arc<AgentHandle>>>>,
    /// identity -> lifecycle lock
    lifecycle: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AgentRegistry {
    /// Create an empty registry backed by `runtime`
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime,
            agents: Arc::new(RwLock::new(HashMap::new())),
            lifecycle: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of running agents, ordered by name then identity
    pub async fn list(&self) -> Vec<AgentSummary> {
        let mut agents: Vec<AgentSummary> = self
            .agents
            .read()
            .await
            .values()
            .map(|handle| handle.summary())
            .collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        agents
    }

    /// Look up a running agent
    pub async fn get(&self, agent_id: &str) -> Option<Arc<AgentHandle>> {
        self.agents.read().await.get(agent_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }

    /// Validate and start an agent.
    ///
    /// Fails with `AlreadyRunning` when the derived identity is taken; the
    /// running agent is left untouched and nothing is started.
    pub async fn start(&self, raw: &serde_json::Value) -> Result<Arc<AgentHandle>> {
        let character = self.validate(raw)?;
        let agent_id = character.agent_id();
        let _lifecycle = self.lock_identities(&[agent_id.as_str()]).await;

        if self.agents.read().await.contains_key(&agent_id) {
            return Err(Error::AlreadyRunning(agent_id));
        }

        self.launch(character).await
    }

    /// Stop an agent and deregister it. Stopping twice is a no-op.
    pub async fn stop(&self, handle: &Arc<AgentHandle>) {
        let _lifecycle = self.lock_identities(&[handle.id.as_str()]).await;
        self.stop_locked(handle).await;
    }

    /// Stop the agent registered under `agent_id`, returning whether one was running
    pub async fn stop_identity(&self, agent_id: &str) -> bool {
        let _lifecycle = self.lock_identities(&[agent_id]).await;
        match self.get(agent_id).await {
            Some(handle) => {
                self.stop_locked(&handle).await;
                true
            }
            None => false,
        }
    }

    /// Replace the agent at `agent_id` with one started from `raw`.
    ///
    /// The existing agent is stopped before the new configuration takes
    /// effect. If validation or start then fails the error is returned and
    /// the old agent stays stopped. When the new configuration derives a
    /// different identity that is already running, that agent is stopped too.
    pub async fn replace(
        &self,
        agent_id: &str,
        raw: &serde_json::Value,
    ) -> Result<Arc<AgentHandle>> {
        // Validated up front to learn which identities to lock
        let validated = self.validate(raw);
        let new_id = validated.as_ref().ok().map(CharacterConfig::agent_id);
        let mut identities = vec![agent_id];
        if let Some(new_id) = new_id.as_deref() {
            identities.push(new_id);
        }
        let _lifecycle = self.lock_identities(&identities).await;

        if let Some(existing) = self.get(agent_id).await {
            tracing::info!(agent_id = %agent_id, name = %existing.name, "Stopping agent for replacement");
            self.stop_locked(&existing).await;
        }

        let character = validated?;
        let new_id = character.agent_id();
        if new_id != agent_id {
            if let Some(occupant) = self.get(&new_id).await {
                tracing::warn!(
                    agent_id = %new_id,
                    replaced_from = %agent_id,
                    "Identity already running, stopping it before swap"
                );
                self.stop_locked(&occupant).await;
            }
        }

        self.launch(character).await
    }

    /// Stop every running agent
    pub async fn stop_all(&self) {
        let handles: Vec<Arc<AgentHandle>> = self.agents.read().await.values().cloned().collect();
        for handle in handles {
            self.stop(&handle).await;
        }
    }

    /// Acquire the lifecycle locks of `identities` in sorted order.
    ///
    /// Locks nobody holds or waits on are dropped from the map on the way.
    async fn lock_identities(&self, identities: &[&str]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids: Vec<&str> = identities.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let locks: Vec<Arc<Mutex<()>>> = {
            let mut by_identity = self.lifecycle.lock().await;
            by_identity.retain(|_, lock| Arc::strong_count(lock) > 1);
            ids.iter()
                .map(|id| {
                    by_identity
                        .entry((*id).to_string())
                        .or_insert_with(|| Arc::new(Mutex::new(())))
                        .clone()
                })
                .collect()
        };

        let mut guards = Vec::with_capacity(locks.len());
        for lock in locks {
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    fn validate(&self, raw: &serde_json::Value) -> Result<CharacterConfig> {
        self.runtime.validate(raw).map_err(|e| {
            tracing::warn!("Error parsing character: {}", e);
            e
        })
    }

    /// Start through the runtime and register. Caller holds the identity's lifecycle lock.
    async fn launch(&self, character: CharacterConfig) -> Result<Arc<AgentHandle>> {
        let name = character.name.clone();
        let handle = match self.runtime.start(character).await {
            Ok(handle) => Arc::new(handle),
            Err(Error::Start(message)) => {
                tracing::warn!(name = %name, "Agent failed to start: {}", message);
                return Err(Error::Start(message));
            }
            Err(e) => {
                tracing::warn!(name = %name, "Agent failed to start: {}", e);
                return Err(Error::Start(e.to_string()));
            }
        };

        self.agents
            .write()
            .await
            .insert(handle.id.clone(), handle.clone());

        tracing::info!(agent_id = %handle.id, name = %handle.name, "{} started", handle.name);
        Ok(handle)
    }

    /// Terminate once, then drop the registry entry if it still points at this handle
    async fn stop_locked(&self, handle: &Arc<AgentHandle>) {
        if handle.mark_stopped() {
            self.runtime.terminate(handle).await;
            tracing::info!(agent_id = %handle.id, name = %handle.name, "Agent stopped");
        }

        let mut agents = self.agents.write().await;
        if agents
            .get(&handle.id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
        {
            agents.remove(&handle.id);
        }
    }
}
