//! Postwarden server: shared state construction and the HTTP serve loop

use crate::agent::{AgentRegistry, AgentRuntime, AgentState, LocalRuntime};
use crate::api::build_app;
use crate::config::WardenConfig;
use crate::error::{Error, Result};
use crate::moderation::{
    dispatcher_from_config, ModerationHistory, ModerationService, ModerationState,
};
use axum::Router;
use std::path::Path;
use std::sync::Arc;

/// Registry plus moderation service, owned for the lifetime of the process
pub struct Warden {
    config: WardenConfig,
    registry: Arc<AgentRegistry>,
    moderation: Arc<ModerationService>,
}

impl Warden {
    /// Build with the in-process runtime and the configured dispatcher
    pub fn from_config(config: WardenConfig) -> Result<Self> {
        let dispatcher = dispatcher_from_config(&config.dispatch)?;
        tracing::info!(dispatcher = dispatcher.name(), "Post dispatcher configured");
        Ok(Self::with_runtime(
            config,
            Arc::new(LocalRuntime::new(dispatcher)),
        ))
    }

    /// Build around a caller-supplied runtime
    pub fn with_runtime(config: WardenConfig, runtime: Arc<dyn AgentRuntime>) -> Self {
        let registry = Arc::new(AgentRegistry::new(runtime));
        let history = ModerationHistory::new(config.moderation.history_capacity);
        let moderation = Arc::new(ModerationService::new(registry.clone(), history));
        Self {
            config,
            registry,
            moderation,
        }
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn moderation(&self) -> &Arc<ModerationService> {
        &self.moderation
    }

    /// HTTP application over this state
    pub fn router(&self) -> Result<Router> {
        let max_payload = self.config.server.max_payload_bytes()?;
        Ok(build_app(
            AgentState {
                registry: self.registry.clone(),
            },
            ModerationState {
                service: self.moderation.clone(),
            },
            &self.config.server.cors_origins,
            max_payload,
        ))
    }

    /// Start an agent from a character JSON file
    pub async fn start_character_file(&self, path: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(path).await?;
        let raw: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| Error::Validation(format!("{}: {}", path.display(), e)))?;
        let handle = self.registry.start(&raw).await?;
        Ok(handle.id.clone())
    }

    /// Start every configured boot character; failures are logged and skipped
    pub async fn start_boot_characters(&self) -> usize {
        let mut started = 0;
        for path in &self.config.agents.characters {
            match self.start_character_file(path).await {
                Ok(agent_id) => {
                    tracing::info!(agent_id = %agent_id, file = %path.display(), "Boot character started");
                    started += 1;
                }
                Err(e) => {
                    tracing::error!(file = %path.display(), "Failed to start character: {}", e);
                }
            }
        }
        started
    }

    /// Serve the HTTP API until `shutdown` resolves, then stop all agents
    pub async fn serve<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Postwarden API listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router()?)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Stopping {} running agent(s)", self.registry.len().await);
        self.registry.stop_all().await;
        Ok(())
    }
}
