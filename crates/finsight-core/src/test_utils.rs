//! Test utilities for finsight-core
//!
//! Provides a mock OpenAI-compatible chat server that records what it receives,
//! for integration tests of the HTTP advisor backend.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock answers chat completions
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with one choice carrying this text
    Text(String),
    /// 200 with an empty `choices` array
    NoChoices,
    /// Error status code with an OpenAI-style error body
    Error(u16, String),
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// A chat completion the mock server received
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Mock OpenAI-compatible server for testing
pub struct MockChatServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start a server that answers every completion with `reply`
    pub async fn start(reply: MockReply) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply,
            received: received.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Shorthand for a server that always replies with `text`
    pub async fn replying(text: &str) -> Self {
        Self::start(MockReply::Text(text.to_string())).await
    }

    /// Base URL including the `/v1` segment
    pub fn url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Completions received so far, oldest first
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [
            {"id": "llama-3.1-8b-instant", "object": "model"},
            {"id": "llama-3.3-70b-versatile", "object": "model"},
            {"id": "mixtral-8x7b-32768", "object": "model"}
        ]
    }))
}

async fn handle_chat(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let model = body["model"].as_str().unwrap_or("unknown").to_string();

    state.received.lock().unwrap().push(ReceivedRequest {
        authorization,
        body,
    });

    match state.reply {
        MockReply::Text(text) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        MockReply::NoChoices => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": []
        }))
        .into_response(),
        MockReply::Error(code, message) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({
                "error": {"message": message, "type": "invalid_request_error"}
            })),
        )
            .into_response(),
    }
}
