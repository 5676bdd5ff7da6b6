//! Agent module: lifecycle registry for running agents
//!
//! Agents are started from character configurations through an
//! [`AgentRuntime`] and kept in an [`AgentRegistry`] keyed by identity.
//!
//! ```text
//! POST /agents/:id/set ──► AgentRegistry::replace
//!                            ├ runtime.validate(character)
//!                            ├ lock old and new identity
//!                            ├ stop existing (runtime.terminate, deregister)
//!                            └ runtime.start ──► AgentHandle { capabilities }
//!                                                  └ twitter ──► SocialPoster (PostQueue)
//! ```

pub mod handler;
pub mod registry;
pub mod runtime;
pub mod types;
pub mod validate;

pub use handler::{agent_router, AgentState};
pub use registry::AgentRegistry;
pub use runtime::{AgentRuntime, LocalRuntime};
pub use types::{AgentDetail, AgentHandle, AgentSummary, Bio, Capability, CharacterConfig};
pub use validate::validate_character_config;
