//! Postwarden configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `server.max_payload`
pub const MAX_PAYLOAD_ENV: &str = "POSTWARDEN_MAX_PAYLOAD";

/// Main Postwarden configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WardenConfig {
    /// HTTP control surface configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Moderation queue configuration
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Outbound post dispatch configuration
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Agents started at boot
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size, e.g. "100kb"
    pub max_payload: String,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_payload: "100kb".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Request body limit in bytes
    pub fn max_payload_bytes(&self) -> Result<usize> {
        parse_size(&self.max_payload)
    }
}

/// Moderation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Resolved posts kept in the audit trail (0 = disabled)
    pub history_capacity: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            history_capacity: crate::moderation::history::DEFAULT_CAPACITY,
        }
    }
}

/// Dispatch client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Webhook receiving approved posts; approved posts are only logged when unset
    pub webhook_url: Option<String>,

    /// Webhook request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 30,
        }
    }
}

/// Boot-time agents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Character JSON files to start when the server boots
    pub characters: Vec<PathBuf>,
}

impl WardenConfig {
    /// Load configuration from a TOML file and apply env overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: WardenConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.apply_env();
        Ok(config)
    }

    /// Load from `path`, or from the default location when present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        Self::load_with_fallback(path, Self::default_path())
    }

    fn load_with_fallback(path: Option<&Path>, fallback: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match fallback {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Default config location (~/.postwarden/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".postwarden").join("config.toml"))
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(MAX_PAYLOAD_ENV) {
            if !value.trim().is_empty() {
                self.server.max_payload = value;
            }
        }
    }
}

/// Parse a human-readable size ("100kb", "2MB", "512") into bytes.
///
/// Units are 1024-based.
pub fn parse_size(input: &str) -> Result<usize> {
    let normalized = input.trim().to_ascii_lowercase();
    let split = normalized
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(normalized.len());
    let (digits, unit) = normalized.split_at(split);

    let value: usize = digits
        .parse()
        .map_err(|_| Error::Config(format!("invalid size '{}'", input)))?;
    let multiplier: usize = match unit.trim() {
        "" | "b" => 1,
        "kb" => 1024,
        "mb" => 1024 * 1024,
        "gb" => 1024 * 1024 * 1024,
        other => {
            return Err(Error::Config(format!(
                "unknown size unit '{}' in '{}'",
                other, input
            )))
        }
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| Error::Config(format!("size '{}' overflows", input)))
}
