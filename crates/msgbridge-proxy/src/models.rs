//! Response bodies for the relay's own endpoints.
//!
//! The translated request/response types live in `msgbridge-core`; this
//! module holds the static health, status, model-list and error payloads.

use serde::{Deserialize, Serialize};

use crate::config::RelayConfig;

const HEALTH_MODE: &str = "anthropic-to-openai-translator";
const STATUS_MODE: &str = "format-translator-only";

// =============================================================================
// Health / Status
// =============================================================================

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub provider: String,
    pub mode: String,
}

impl HealthResponse {
    pub fn healthy(config: &RelayConfig) -> Self {
        Self {
            status: "healthy".to_string(),
            service: config.service_name.clone(),
            provider: config.provider_name.clone(),
            mode: HEALTH_MODE.to_string(),
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub service: String,
    pub provider: String,
    /// Upstream endpoint every request is forwarded to.
    pub endpoint: String,
    pub mode: String,
}

impl From<&RelayConfig> for StatusResponse {
    fn from(config: &RelayConfig) -> Self {
        Self {
            service: config.service_name.clone(),
            provider: config.provider_name.clone(),
            endpoint: config.upstream.url.clone(),
            mode: STATUS_MODE.to_string(),
        }
    }
}

// =============================================================================
// Models Endpoint Types
// =============================================================================

/// Response from `/v1/models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelsResponse {
    /// The single catch-all entry advertised by the relay.
    ///
    /// The caller picks the real model per request; this entry only exists so
    /// clients that probe the model list find something.
    pub fn provider_default() -> Self {
        Self {
            object: "list".to_string(),
            data: vec![ModelInfo {
                id: "openrouter/default".to_string(),
                object: "model".to_string(),
                created: 1_735_948_800,
                owned_by: "openrouter".to_string(),
                context_window: 200_000,
            }],
        }
    }
}

/// Information about a single model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    pub context_window: u64,
}

// =============================================================================
// Error Response Types
// =============================================================================

/// Error response matching the Anthropic error shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                r#type: error_type.into(),
                message: message.into(),
            },
        }
    }
}

/// Body returned for unknown routes: `{"error": "Not found"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub error: String,
}

impl Default for NotFoundResponse {
    fn default() -> Self {
        Self {
            error: "Not found".to_string(),
        }
    }
}
