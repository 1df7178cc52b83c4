use serde::{Deserialize, Serialize};
use std::fmt;

/// Short hex id used to correlate one outbound request across log lines.
pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

/// Identity of one chat session (one mounted chat surface).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to tell sessions apart in logs.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_valid_uuid() {
        let sid = SessionId::new();
        let parsed = uuid::Uuid::parse_str(sid.as_str());
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().get_version_num(), 4);
    }

    #[test]
    fn correlation_id_is_eight_hex_chars() {
        let cid = new_correlation_id();
        assert_eq!(cid.len(), 8);
        assert!(cid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn correlation_ids_differ() {
        assert_ne!(new_correlation_id(), new_correlation_id());
    }

    #[test]
    fn session_id_short_is_prefix() {
        let sid = SessionId::new();
        assert_eq!(sid.short().len(), 8);
        assert!(sid.as_str().starts_with(sid.short()));
    }

    #[test]
    fn session_id_display_matches_str() {
        let sid = SessionId::default();
        assert_eq!(sid.to_string(), sid.as_str());
    }

    #[test]
    fn session_ids_are_unique() {
        let sid = SessionId::new();
        assert_eq!(sid, sid.clone());
        assert_ne!(sid, SessionId::new());
    }

    #[test]
    fn session_id_serializes_as_plain_string() {
        let sid = SessionId::new();
        let json = serde_json::to_string(&sid).unwrap();
        assert_eq!(json, format!("\"{}\"", sid.as_str()));
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(sid, back);
    }
}
