use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockito::Matcher;
use serde_json::json;

use super::*;
use crate::{Message, Role};

fn endpoint(server: &mockito::Server) -> AgentEndpoint {
    AgentEndpoint::new(server.url())
}

fn sample_log() -> Vec<Message> {
    vec![Message::assistant("hi"), Message::user("status?", None)]
}

#[tokio::test]
async fn invoke_posts_messages_and_page() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/invoke_agent")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "messages": [
                {"role": "assistant", "content": "hi"},
                {"role": "user", "content": "status?"}
            ],
            "currentPage": "fleetDashboard",
            "image": null
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"role":"assistant","content":"3 vehicles unassigned"}"#)
        .create_async()
        .await;

    let client = AgentClient::http(endpoint(&server)).unwrap();
    let reply = client.invoke(&sample_log(), "fleetDashboard", None).await;

    mock.assert_async().await;
    assert_eq!(reply, Message::assistant("3 vehicles unassigned"));
}

#[tokio::test]
async fn invoke_forwards_image() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/invoke_agent")
        .match_body(Matcher::PartialJson(json!({
            "image": "data:image/png;base64,AAAA"
        })))
        .with_status(200)
        .with_body(r#"{"role":"assistant","content":"a bus"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = AgentClient::http(endpoint(&server)).unwrap();
    let reply = client
        .invoke(&sample_log(), "busDashboard", Some("data:image/png;base64,AAAA"))
        .await;

    mock.assert_async().await;
    assert_eq!(reply.content, "a bus");
}

#[tokio::test]
async fn server_error_becomes_apology() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/invoke_agent")
        .with_status(500)
        .with_body(r#"{"detail":"Movi encountered an error"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = AgentClient::http(endpoint(&server)).unwrap();
    let reply = client.invoke(&sample_log(), "busDashboard", None).await;

    // exactly one request: no retry
    mock.assert_async().await;
    assert_eq!(reply, Message::assistant(APOLOGY));
}

#[tokio::test]
async fn transport_reports_api_detail() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/invoke_agent")
        .with_status(422)
        .with_body(r#"{"detail":"messages must not be empty"}"#)
        .create_async()
        .await;

    let transport = HttpTransport::new(endpoint(&server)).unwrap();
    let request = InvokeRequest {
        messages: &[],
        current_page: "busDashboard",
        image: None,
    };
    match transport.invoke(&request).await {
        Err(AgentError::Api { status, detail }) => {
            assert_eq!(status, 422);
            assert_eq!(detail, "messages must not be empty");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_becomes_apology() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/invoke_agent")
        .with_status(200)
        .with_body(r#"{"reply":"not a message"}"#)
        .create_async()
        .await;

    let client = AgentClient::http(endpoint(&server)).unwrap();
    let reply = client.invoke(&sample_log(), "busDashboard", None).await;
    assert_eq!(reply.content, APOLOGY);
    assert_eq!(reply.role, Role::Assistant);
}

#[tokio::test]
async fn unreachable_backend_becomes_apology() {
    // Port 9 (discard) is closed on test machines.
    let endpoint = AgentEndpoint::new("http://127.0.0.1:9")
        .with_timeouts(Duration::from_secs(1), Duration::from_secs(2));
    let client = AgentClient::http(endpoint).unwrap();
    let reply = client.invoke(&sample_log(), "busDashboard", None).await;
    assert_eq!(reply, Message::assistant(APOLOGY));
}

#[tokio::test]
async fn health_checks_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let client = AgentClient::http(endpoint(&server)).unwrap();
    assert!(client.health().await.is_ok());
    ok.assert_async().await;
}

#[tokio::test]
async fn unhealthy_backend_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(503)
        .with_body("down for maintenance")
        .create_async()
        .await;

    let client = AgentClient::http(endpoint(&server)).unwrap();
    match client.health().await {
        Err(AgentError::Api { status, detail }) => {
            assert_eq!(status, 503);
            assert_eq!(detail, "down for maintenance");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn non_assistant_reply_is_parse_error() {
    let err = HttpTransport::parse_reply(r#"{"role":"user","content":"echo"}"#).unwrap_err();
    assert!(matches!(err, AgentError::Parse(_)));
}

#[test]
fn error_detail_falls_back_to_body() {
    assert_eq!(HttpTransport::error_detail(r#"{"detail":"boom"}"#), "boom");
    assert_eq!(HttpTransport::error_detail("plain text"), "plain text");
    assert_eq!(HttpTransport::error_detail(""), "An unknown error occurred.");

    let long = "x".repeat(500);
    assert_eq!(HttpTransport::error_detail(&long).len(), 200);
}

#[test]
fn endpoint_joins_paths() {
    let ep = AgentEndpoint::new("http://movi.local:8000/");
    assert_eq!(ep.invoke_url, "http://movi.local:8000/invoke_agent");
    assert_eq!(ep.health_url, "http://movi.local:8000/health");
}

/// Transport that records what it was asked and replays a canned result.
struct RecordingTransport {
    seen: Mutex<Vec<(usize, String, Option<String>)>>,
    fail: bool,
}

#[async_trait]
impl AgentTransport for RecordingTransport {
    async fn invoke(&self, request: &InvokeRequest<'_>) -> Result<Message, AgentError> {
        self.seen.lock().unwrap().push((
            request.messages.len(),
            request.current_page.to_string(),
            request.image.map(str::to_string),
        ));
        if self.fail {
            Err(AgentError::Timeout)
        } else {
            Ok(Message::assistant("ok"))
        }
    }
}

#[tokio::test]
async fn client_passes_request_through_transport() {
    let transport = Arc::new(RecordingTransport {
        seen: Mutex::new(Vec::new()),
        fail: false,
    });
    let client = AgentClient::new(transport.clone());
    let reply = client
        .invoke(&sample_log(), "routes", Some("data:image/gif;base64,R0"))
        .await;

    assert_eq!(reply.content, "ok");
    let seen = transport.seen.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &[(2, "routes".to_string(), Some("data:image/gif;base64,R0".to_string()))]
    );
}

#[tokio::test]
async fn client_absorbs_transport_error() {
    let transport = Arc::new(RecordingTransport {
        seen: Mutex::new(Vec::new()),
        fail: true,
    });
    let client = AgentClient::new(transport);
    let reply = client.invoke(&sample_log(), "routes", None).await;
    assert_eq!(reply, Message::assistant(APOLOGY));
    // default health impl
    assert!(client.health().await.is_ok());
}
