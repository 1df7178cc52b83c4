//! Agent backend connection settings.

use serde::{Deserialize, Serialize};

/// Where the Movi agent backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL of the agent backend, without a trailing slash.
    pub base_url: String,
    pub invoke_path: String,
    pub health_path: String,
    /// Valid range: 1-60.
    pub connect_timeout_secs: u32,
    /// Valid range: 1-600.
    pub request_timeout_secs: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            invoke_path: "/invoke_agent".into(),
            health_path: "/health".into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl AgentConfig {
    pub fn invoke_url(&self) -> String {
        join_url(&self.base_url, &self.invoke_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
