//! Route geometry provider settings.

use serde::{Deserialize, Serialize};

/// OSRM routing service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub osrm_url: String,
    /// OSRM profile: `driving`, `walking` or `cycling`.
    pub profile: String,
    /// Valid range: 1-60.
    pub timeout_secs: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            osrm_url: "https://router.project-osrm.org".into(),
            profile: "driving".into(),
            timeout_secs: 10,
        }
    }
}
