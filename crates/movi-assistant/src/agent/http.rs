//! HTTP transport for the dashboard backend (`POST /invoke_agent`).

use async_trait::async_trait;
use tracing::debug;

use crate::{AgentError, Message, Role};

use super::config::AgentEndpoint;
use super::{AgentTransport, InvokeRequest};

/// Longest error body echoed back when the backend sends no `detail`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// reqwest-backed agent transport.
pub struct HttpTransport {
    pub(crate) endpoint: AgentEndpoint,
    pub(crate) http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(endpoint: AgentEndpoint) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .connect_timeout(endpoint.connect_timeout)
            .timeout(endpoint.request_timeout)
            .build()
            .map_err(|e| AgentError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &AgentEndpoint {
        &self.endpoint
    }

    /// Turn a non-success response body into the backend's `detail` text.
    pub(crate) fn error_detail(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| json.get("detail").and_then(detail_text))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "An unknown error occurred.".to_string()
                } else {
                    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
                }
            })
    }

    /// Parse a success body into an assistant message.
    pub(crate) fn parse_reply(body: &str) -> Result<Message, AgentError> {
        let reply: Message =
            serde_json::from_str(body).map_err(|e| AgentError::Parse(e.to_string()))?;
        if reply.role != Role::Assistant {
            return Err(AgentError::Parse(format!(
                "expected an assistant message, got role '{}'",
                reply.role.as_str()
            )));
        }
        Ok(reply)
    }
}

/// FastAPI sends `detail` as a string, or as a list of validation errors.
fn detail_text(detail: &serde_json::Value) -> Option<String> {
    match detail {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn transport_error(e: reqwest::Error) -> AgentError {
    if e.is_timeout() {
        AgentError::Timeout
    } else {
        AgentError::Network(e.to_string())
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn invoke(&self, request: &InvokeRequest<'_>) -> Result<Message, AgentError> {
        debug!(url = %self.endpoint.invoke_url, "agent request");

        let response = self
            .http
            .post(&self.endpoint.invoke_url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(AgentError::Api {
                status: status.as_u16(),
                detail: Self::error_detail(&body),
            });
        }

        Self::parse_reply(&body)
    }

    async fn health(&self) -> Result<(), AgentError> {
        let response = self
            .http
            .get(&self.endpoint.health_url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AgentError::Api {
                status: status.as_u16(),
                detail: Self::error_detail(&body),
            })
        }
    }
}
