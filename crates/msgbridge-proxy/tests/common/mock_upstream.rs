//! Stub chat-completions upstream for integration testing.
//!
//! Serves one canned response for every POST and records what it received,
//! so tests can check both sides of the translation.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

/// Path the stub answers on, mirroring the real provider.
pub const UPSTREAM_PATH: &str = "/api/v1/chat/completions";

/// A request received by the stub.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Debug)]
struct MockState {
    status: StatusCode,
    body: String,
    captured: Mutex<Vec<CapturedRequest>>,
    /// When set, each reply waits for a notification before it is sent.
    release: Option<Arc<Notify>>,
}

/// Running stub upstream bound to an ephemeral local port.
pub struct MockUpstream {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    /// Start a stub answering every POST with `status` and the raw `body`.
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        Self::spawn(status, body.into(), None).await
    }

    /// Start a stub answering 200 with a JSON value.
    pub async fn json(body: &Value) -> Self {
        Self::start(StatusCode::OK, body.to_string()).await
    }

    /// Start a stub that records each request immediately but holds the
    /// 200 reply until `release` is notified.
    pub async fn held(body: &Value, release: Arc<Notify>) -> Self {
        Self::spawn(StatusCode::OK, body.to_string(), Some(release)).await
    }

    async fn spawn(status: StatusCode, body: String, release: Option<Arc<Notify>>) -> Self {
        let state = Arc::new(MockState {
            status,
            body,
            captured: Mutex::new(Vec::new()),
            release,
        });

        let app = Router::new()
            .route(UPSTREAM_PATH, post(handle_completion))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Full URL of the stub endpoint.
    pub fn url(&self) -> String {
        format!("http://{}{UPSTREAM_PATH}", self.addr)
    }

    /// Requests received so far, in arrival order.
    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.state.captured.lock().await.clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_completion(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state
        .captured
        .lock()
        .await
        .push(CapturedRequest { headers, body });

    if let Some(release) = &state.release {
        release.notified().await;
    }

    (
        state.status,
        [(CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// URL of a local port with nothing listening on it.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{UPSTREAM_PATH}")
}
