//! Assistant core for Movi.
//!
//! Provides the pieces behind the fleet dashboard's chat widget:
//! - `Message` model shared with the agent backend
//! - Fail-closed agent client over a pluggable transport
//! - Session manager with optimistic append and a single in-flight send
//! - Speech bridge (synthesis + recognition) behind capability checks
//! - Image attachments encoded as data URIs

pub mod agent;
pub mod attachment;
pub mod page;
pub mod session;
pub mod speech;

use serde::{Deserialize, Serialize};

pub use agent::{AgentClient, AgentEndpoint, AgentTransport, HttpTransport, InvokeRequest, APOLOGY};
pub use attachment::AttachmentError;
pub use page::page_label;
pub use session::{SendOutcome, Session, SessionSnapshot};
pub use speech::{Capability, Listener, SpeechError, Speaker};

/// One entry of the conversation log.
///
/// `image` carries a data URI for user messages that attached a picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: None,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("network error: {0}")]
    Network(String),
    #[error("agent returned HTTP {status}: {detail}")]
    Api { status: u16, detail: String },
    #[error("malformed agent reply: {0}")]
    Parse(String),
    #[error("request timed out")]
    Timeout,
}
