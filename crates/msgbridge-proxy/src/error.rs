//! Relay error types and their HTTP mapping.

use std::error::Error as StdError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::models::{ErrorResponse, NotFoundResponse};

/// Errors surfaced to the caller by the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound body could not be parsed. Never reaches the upstream.
    #[error("{0}")]
    InvalidRequest(String),

    /// The upstream could not be reached, or its body could not be read or parsed.
    #[error("{0}")]
    Upstream(String),

    /// No route for this method and path.
    #[error("Not found")]
    NotFound,
}

impl RelayError {
    /// Build an upstream error from a source error, keeping its cause chain.
    pub fn upstream(err: &(dyn StdError + 'static)) -> Self {
        Self::Upstream(error_chain(err))
    }

    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Anthropic error type discriminant.
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Upstream(_) => "api_error",
            Self::NotFound => "not_found_error",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::NotFound => (status, Json(NotFoundResponse::default())).into_response(),
            other => {
                let body = ErrorResponse::new(other.to_string(), other.error_type());
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Render an error and all of its sources as `outer: inner: root`.
///
/// reqwest puts the interesting part (connection refused, DNS failure) in
/// the source chain rather than the top-level message.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
