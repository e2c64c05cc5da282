//! Outbound call to the upstream chat-completions endpoint.
//!
//! One POST per inbound request. The whole response body is buffered and
//! parsed as JSON before anything else happens; nothing is streamed and
//! nothing is retried.

use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use msgbridge_core::ChatCompletionRequest;

use crate::config::UpstreamConfig;
use crate::error::RelayError;

/// HTTP client bound to a single upstream endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a client for the given upstream.
    ///
    /// No request timeout is set: a slow upstream holds the caller's
    /// connection open until it answers or the connection drops.
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().pool_max_idle_per_host(10).build()?;
        Ok(Self { client, config })
    }

    /// Endpoint this client posts to.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Send a chat-completions request and return the parsed response body.
    ///
    /// Non-2xx statuses are logged but not treated as failures: the body is
    /// still returned so the caller can translate whatever the provider said.
    pub async fn send(&self, request: &ChatCompletionRequest) -> Result<Value, RelayError> {
        let body = serde_json::to_vec(request).map_err(|e| RelayError::upstream(&e))?;

        info!(
            model = ?request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Forwarding to upstream"
        );
        debug!(url = %self.config.url, bytes = body.len(), "Upstream request");

        let mut builder = self
            .client
            .post(&self.config.url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title);

        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.body(body).send().await.map_err(|e| {
            error!("Upstream request error: {e}");
            RelayError::upstream(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Upstream returned a non-success status");
        }

        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read upstream response: {e}");
            RelayError::upstream(&e)
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            error!("Upstream parse error: {e}");
            RelayError::upstream(&e)
        })
    }
}
