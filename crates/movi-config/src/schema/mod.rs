//! Configuration schema types for Movi.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod agent;
mod routing;
mod session;
mod speech;
mod system;

pub use agent::*;
pub use routing::*;
pub use session::*;
pub use speech::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration for Movi.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct MoviConfig {
    pub agent: AgentConfig,
    pub session: SessionConfig,
    pub speech: SpeechConfig,
    pub routing: RoutingConfig,
    pub logging: LoggingConfig,
}

impl MoviConfig {
    /// Apply environment overrides (`MOVI_AGENT_URL`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MOVI_AGENT_URL") {
            if !url.trim().is_empty() {
                tracing::info!("agent base_url overridden by MOVI_AGENT_URL");
                self.agent.base_url = url.trim().to_string();
            }
        }
    }
}
