//! Postwarden - agent lifecycle control and outbound post moderation
//!
//! Postwarden is the control surface in front of long-running autonomous
//! agents. It starts, stops and hot-swaps agents keyed by identity, and
//! holds the social posts those agents generate until a human approves or
//! rejects them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Postwarden HTTP API (axum)                  │
//! │   /agents/*                         /agents/:id/*-tweet*         │
//! └───────────┬──────────────────────────────────┬───────────────────┘
//!             │                                  │
//! ┌───────────▼──────────────┐     ┌─────────────▼────────────────────┐
//! │      AgentRegistry       │◄────┤        ModerationService         │
//! │  identity → AgentHandle  │     │  approve / reject state machine  │
//! │  start / stop / replace  │     │  bounded audit trail             │
//! └───────────┬──────────────┘     └─────────────┬────────────────────┘
//!             │ AgentRuntime                      │ SocialPoster
//! ┌───────────▼──────────────┐     ┌─────────────▼────────────────────┐
//! │  validate / start /      │     │  PostQueue (per agent)           │
//! │  terminate               │     │  PostDispatcher: reply / quote   │
//! └──────────────────────────┘     └──────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`agent`]: character validation, runtime factory, lifecycle registry
//! - [`moderation`]: pending post queues, dispatch clients, approval service
//! - [`api`]: unified HTTP router
//! - [`server`]: process-wide state and serve loop
//! - [`config`]: configuration management

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod moderation;
pub mod server;

pub use config::WardenConfig;
pub use error::{Error, Result};
pub use server::Warden;
