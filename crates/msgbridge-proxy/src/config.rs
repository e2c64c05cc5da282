//! Process-scoped relay configuration.
//!
//! Built once at startup by the binary and shared read-only with every
//! request handler.

use std::fmt;

/// Upstream chat-completions endpoint used when none is configured.
pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Name reported by `/health` and `/status`.
pub const DEFAULT_SERVICE_NAME: &str = "msgbridge";

/// Provider name reported by `/health` and `/status`.
pub const DEFAULT_PROVIDER_NAME: &str = "OpenRouter";

/// Value of the `HTTP-Referer` header sent upstream.
pub const DEFAULT_REFERER: &str = "https://msgbridge.local";

/// Value of the `X-Title` header sent upstream.
pub const DEFAULT_TITLE: &str = "msgbridge";

/// Where and how to reach the upstream provider.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Full URL of the chat-completions endpoint.
    pub url: String,
    /// Server-held credential sent as `Authorization: Bearer`.
    pub api_key: Option<String>,
    /// Static `HTTP-Referer` header value.
    pub referer: String,
    /// Static `X-Title` header value.
    pub title: String,
}

impl UpstreamConfig {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::new(DEFAULT_UPSTREAM_URL, None)
    }
}

// Keep the credential out of logs.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish()
    }
}

/// Configuration for the relay server.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub service_name: String,
    pub provider_name: String,
    pub upstream: UpstreamConfig,
}

impl RelayConfig {
    /// Create a config for the given upstream with default identity strings.
    pub fn new(upstream: UpstreamConfig) -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            upstream,
        }
    }

    /// Whether a service credential is available for upstream calls.
    pub const fn has_api_key(&self) -> bool {
        self.upstream.api_key.is_some()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new(UpstreamConfig::default())
    }
}
