//! Chat session settings.

use serde::{Deserialize, Serialize};

/// Chat session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed assistant message shown when the chat opens. Empty disables it.
    pub greeting: String,
    /// Page context sent when the surface does not supply one.
    pub default_page: String,
    /// Largest image accepted as an attachment (valid range: 1 KiB - 20 MiB).
    pub max_image_bytes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: "👋 Hi! I'm Movi. You can now upload images for context. How can I help?"
                .into(),
            default_page: "busDashboard".into(),
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

impl SessionConfig {
    /// The greeting, or `None` when it is blank.
    pub fn greeting(&self) -> Option<&str> {
        let trimmed = self.greeting.trim();
        (!trimmed.is_empty()).then_some(self.greeting.as_str())
    }
}
