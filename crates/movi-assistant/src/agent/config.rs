//! Agent endpoint configuration.

use std::time::Duration;

/// Where to reach the agent backend and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEndpoint {
    pub invoke_url: String,
    pub health_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl AgentEndpoint {
    /// Endpoint rooted at `base_url` with the backend's standard paths.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self {
            invoke_url: format!("{base}/invoke_agent"),
            health_url: format!("{base}/health"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_urls(mut self, invoke_url: impl Into<String>, health_url: impl Into<String>) -> Self {
        self.invoke_url = invoke_url.into();
        self.health_url = health_url.into();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }
}

impl Default for AgentEndpoint {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000")
    }
}
