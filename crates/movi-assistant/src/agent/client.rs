//! Fail-closed agent client.

use std::sync::Arc;

use movi_common::new_correlation_id;
use tracing::{debug, warn};

use crate::{AgentError, Message};

use super::config::AgentEndpoint;
use super::http::HttpTransport;
use super::{AgentTransport, InvokeRequest};

/// Reply appended when the agent cannot be reached or answers badly.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Stateless agent client. Cheap to clone.
#[derive(Clone)]
pub struct AgentClient {
    transport: Arc<dyn AgentTransport>,
}

impl AgentClient {
    pub fn new(transport: Arc<dyn AgentTransport>) -> Self {
        Self { transport }
    }

    /// Client speaking HTTP to `endpoint`.
    pub fn http(endpoint: AgentEndpoint) -> Result<Self, AgentError> {
        Ok(Self::new(Arc::new(HttpTransport::new(endpoint)?)))
    }

    /// Send the conversation and return the assistant reply.
    ///
    /// Any failure is logged and replaced by an assistant message carrying
    /// [`APOLOGY`]; this never returns an error.
    pub async fn invoke(
        &self,
        messages: &[Message],
        page_context: &str,
        image: Option<&str>,
    ) -> Message {
        let request_id = new_correlation_id();
        let request = InvokeRequest {
            messages,
            current_page: page_context,
            image,
        };

        debug!(
            request_id = %request_id,
            messages = messages.len(),
            page = page_context,
            has_image = image.is_some(),
            "invoking agent"
        );

        match self.transport.invoke(&request).await {
            Ok(reply) => {
                debug!(request_id = %request_id, chars = reply.content.len(), "agent replied");
                reply
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "agent invocation failed");
                Message::assistant(APOLOGY)
            }
        }
    }

    pub async fn health(&self) -> Result<(), AgentError> {
        self.transport.health().await
    }
}
