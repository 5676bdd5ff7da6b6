//! Postwarden - agent lifecycle control and outbound post moderation
//!
//! Runs the HTTP control surface for long-running agents and the approval
//! queue for the posts they generate.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use postwarden::{agent::validate_character_config, config::WardenConfig, Warden};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "postwarden")]
#[command(version)]
#[command(about = "Agent lifecycle control and outbound post moderation")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "POSTWARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP control surface
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Character file to start at boot (repeatable)
        #[arg(long = "character")]
        characters: Vec<PathBuf>,
    },

    /// Validate a character file
    Validate {
        /// Character JSON file
        file: PathBuf,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("postwarden={},tower_http=debug", log_level).into());
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = WardenConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            characters,
        } => {
            run_server(config, host, port, characters).await?;
        }
        Commands::Validate { file } => {
            validate_file(&file)?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(
    mut config: WardenConfig,
    host: Option<String>,
    port: Option<u16>,
    characters: Vec<PathBuf>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.agents.characters.extend(characters);

    let warden = Warden::from_config(config)?;
    let started = warden.start_boot_characters().await;
    tracing::info!("Started {} boot agent(s). Press Ctrl+C to stop.", started);

    warden
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

fn validate_file(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let character = validate_character_config(&raw)?;

    println!("✓ {} is a valid character", file.display());
    println!("  name:     {}", character.name);
    println!("  identity: {}", character.agent_id());
    if !character.clients().is_empty() {
        println!("  clients:  {}", character.clients().join(", "));
    }
    Ok(())
}

fn show_config(config: Option<&WardenConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
