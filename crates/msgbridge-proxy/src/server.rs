//! Axum HTTP server for the relay.
//!
//! This module provides the `serve()` function that runs the relay on a
//! pre-bound `TcpListener` until the cancellation token fires, and
//! `router()` which builds the routes on their own.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request, State, rejection::BytesRejection},
    http::{HeaderMap, Method, Uri, header::USER_AGENT},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use msgbridge_core::{MessagesRequest, MessagesResponse, to_chat_completion, to_messages_response};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::forward::UpstreamClient;
use crate::models::{HealthResponse, ModelsResponse, StatusResponse};

/// Number of characters of an upstream body logged when it has no choices.
const LOGGED_BODY_CHARS: usize = 500;

/// Shared state for the relay handlers. Read-only after startup.
#[derive(Clone)]
struct ProxyState {
    config: Arc<RelayConfig>,
    upstream: UpstreamClient,
}

/// Start the relay with a pre-bound listener.
///
/// Runs until `cancel` is triggered, then stops accepting connections and
/// waits for in-flight requests to finish.
pub async fn serve(
    listener: TcpListener,
    config: RelayConfig,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let endpoint = config.upstream.url.clone();
    let app = router(config)?;

    info!("Relay listening on http://{addr}");
    info!("Forwarding POST /v1/messages to {endpoint}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Relay shut down");
    Ok(())
}

/// Build the relay routes.
///
/// Only exact method+path pairs are served; everything else, including a
/// known path with the wrong method, gets the 404 body.
pub fn router(config: RelayConfig) -> anyhow::Result<Router> {
    let upstream = UpstreamClient::new(config.upstream.clone())?;
    let state = ProxyState {
        config: Arc::new(config),
        upstream,
    };

    // `get` also answers HEAD unless a HEAD handler is set explicitly.
    Ok(Router::new()
        .route(
            "/health",
            get(health_check).head(not_found).fallback(not_found),
        )
        .route("/status", get(status).head(not_found).fallback(not_found))
        .route(
            "/v1/models",
            get(list_models).head(not_found).fallback(not_found),
        )
        .route("/v1/messages", post(create_message).fallback(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(log_request))
        .with_state(state))
}

/// Log every inbound request before it is routed.
async fn log_request(request: Request, next: Next) -> Response {
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    info!(
        method = %request.method(),
        path = %request.uri().path(),
        user_agent,
        "Incoming request"
    );

    next.run(request).await
}

/// Health check endpoint.
async fn health_check(State(state): State<ProxyState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(&state.config))
}

/// Static configuration summary.
async fn status(State(state): State<ProxyState>) -> impl IntoResponse {
    Json(StatusResponse::from(state.config.as_ref()))
}

/// Single-entry model list.
async fn list_models() -> impl IntoResponse {
    info!("Models list requested");
    Json(ModelsResponse::provider_default())
}

async fn not_found(method: Method, uri: Uri) -> RelayError {
    warn!(
        "404 Not Found: {method} {} (expected: POST /v1/messages)",
        uri.path()
    );
    RelayError::NotFound
}

/// Translate a Messages request, forward it upstream, and translate the answer back.
async fn create_message(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessagesResponse>, RelayError> {
    let body = body.map_err(|e| {
        error!("Request body read error: {e}");
        RelayError::InvalidRequest(e.body_text())
    })?;

    let request: MessagesRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Request parse error: {e}");
        RelayError::InvalidRequest(e.to_string())
    })?;

    // Read for parity with the Messages API; access control is left to the network.
    let caller_key = caller_credential(&headers);
    info!(
        model = ?request.model,
        caller_key = caller_key.is_some(),
        "Translating Messages request to chat completion"
    );
    if request.stream == Some(true) {
        debug!("Streaming requested; the reply is still delivered as a single message");
    }

    let chat_request = to_chat_completion(&request);
    let upstream_body = state.upstream.send(&chat_request).await?;

    if !has_choices(&upstream_body) {
        let rendered: String = upstream_body
            .to_string()
            .chars()
            .take(LOGGED_BODY_CHARS)
            .collect();
        warn!("No choices in upstream response: {rendered}");
    }

    let response = to_messages_response(&upstream_body, request.model.as_deref());
    info!(
        id = %response.id,
        stop_reason = %response.stop_reason,
        "Response received from {}",
        state.config.provider_name
    );

    Ok(Json(response))
}

fn has_choices(body: &serde_json::Value) -> bool {
    body.get("choices")
        .and_then(serde_json::Value::as_array)
        .is_some_and(|choices| !choices.is_empty())
}

/// Extract the caller's key from `x-api-key` or a bearer `authorization` header.
fn caller_credential(headers: &HeaderMap) -> Option<String> {
    let header = |name| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    };

    if let Some(key) = header("x-api-key") {
        return Some(key.to_string());
    }

    header("authorization").map(|value| strip_bearer(value).to_string())
}

/// Remove a case-insensitive `Bearer ` prefix, if present.
fn strip_bearer(value: &str) -> &str {
    const PREFIX: &str = "bearer ";
    match value.get(..PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(PREFIX) => &value[PREFIX.len()..],
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderValue, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::UpstreamConfig;

    fn test_router() -> Router {
        // None of these tests reach the upstream.
        router(RelayConfig::new(UpstreamConfig::new(
            "http://127.0.0.1:9/v1/chat/completions",
            None,
        )))
        .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("bearer abc"), "abc");
        assert_eq!(strip_bearer("BEARER abc"), "abc");
        assert_eq!(strip_bearer("abc"), "abc");
        assert_eq!(strip_bearer("Basic abc"), "Basic abc");
    }

    #[test]
    fn test_caller_credential_prefers_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("key-a"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer key-b"));
        assert_eq!(caller_credential(&headers).as_deref(), Some("key-a"));

        headers.remove("x-api-key");
        assert_eq!(caller_credential(&headers).as_deref(), Some("key-b"));

        assert_eq!(caller_credential(&HeaderMap::new()), None);
    }

    #[test]
    fn test_has_choices() {
        assert!(has_choices(&serde_json::json!({"choices": [{}]})));
        assert!(!has_choices(&serde_json::json!({"choices": []})));
        assert!(!has_choices(&serde_json::json!({"error": "x"})));
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["mode"], "anthropic-to-openai-translator");
    }

    #[tokio::test]
    async fn test_wrong_method_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/v1/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Not found"})
        );
    }

    #[tokio::test]
    async fn test_head_on_get_route_is_not_found() {
        for uri in ["/health", "/status", "/v1/models"] {
            let response = test_router()
                .oneshot(
                    Request::builder()
                        .method("HEAD")
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "HEAD {uri}");
        }
    }

    #[tokio::test]
    async fn test_interrupted_body_is_bad_request() {
        let chunks = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"{\"model\": ")),
            Err(std::io::Error::other("client went away")),
        ]);

        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/messages")
                    .body(Body::from_stream(chunks))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert!(json["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/messages")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert!(json["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
    }
}
