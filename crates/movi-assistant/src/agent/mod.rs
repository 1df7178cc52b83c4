//! Movi agent client.
//!
//! The wire layer is the `AgentTransport` trait; `HttpTransport` speaks the
//! dashboard backend's `POST /invoke_agent` JSON protocol. `AgentClient`
//! wraps any transport and fails closed: callers always get a `Message`.

mod client;
mod config;
mod http;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde::Serialize;

use crate::{AgentError, Message};

pub use client::{AgentClient, APOLOGY};
pub use config::AgentEndpoint;
pub use http::HttpTransport;

/// Request body of one agent invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest<'a> {
    pub messages: &'a [Message],
    pub current_page: &'a str,
    pub image: Option<&'a str>,
}

#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Send one request and return the assistant reply. Never retries.
    async fn invoke(&self, request: &InvokeRequest<'_>) -> Result<Message, AgentError>;

    /// Probe the backend. Transports without a health endpoint report healthy.
    async fn health(&self) -> Result<(), AgentError> {
        Ok(())
    }
}
