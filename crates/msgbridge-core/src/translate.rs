//! Bidirectional translation between the Messages and chat-completions formats.
//!
//! Both directions are total. The forward direction fills defaults for every
//! missing sampling parameter; the reverse direction substitutes defaults for
//! anything missing from the upstream payload and never fails.

use serde_json::{Map, Value};

use crate::chat::{ChatCompletionRequest, ChatMessage};
use crate::messages::{MessageContent, MessagesRequest, MessagesResponse, MessagesUsage};

/// `max_tokens` sent upstream when the caller gives none.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
/// `temperature` sent upstream when the caller gives none.
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
/// `stream` sent upstream when the caller gives none.
pub const DEFAULT_STREAM: bool = false;

/// Text of the assistant message returned when the upstream sent no choice.
pub const NO_RESPONSE_TEXT: &str = "Error: No response from provider";

const UNKNOWN_ID: &str = "unknown";
const ERROR_STOP_REASON: &str = "error";

// =============================================================================
// Forward: Messages -> Chat Completions
// =============================================================================

/// Sampling parameters with every default applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
}

impl SamplingParams {
    /// Resolve the effective parameters for a request.
    ///
    /// Explicit values win, including `0` and `0.0`.
    #[must_use]
    pub fn resolve(request: &MessagesRequest) -> Self {
        Self {
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            stream: request.stream.unwrap_or(DEFAULT_STREAM),
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            stream: DEFAULT_STREAM,
        }
    }
}

/// Build the upstream chat-completions body for a Messages request.
///
/// A `system` prompt other than the empty string becomes a leading message
/// with role "system" (a block array is emitted even when empty). The
/// remaining turns keep their order, roles and content.
#[must_use]
pub fn to_chat_completion(request: &MessagesRequest) -> ChatCompletionRequest {
    let params = SamplingParams::resolve(request);

    let system = request
        .system
        .as_ref()
        .filter(|system| !matches!(system, MessageContent::Text(text) if text.is_empty()))
        .cloned()
        .map(ChatMessage::system);

    let messages = system
        .into_iter()
        .chain(request.messages.iter().map(|m| ChatMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        }))
        .collect();

    ChatCompletionRequest {
        model: request.model.clone(),
        messages,
        max_tokens: params.max_tokens,
        temperature: params.temperature,
        stream: params.stream,
    }
}

// =============================================================================
// Reverse: Chat Completions -> Messages
// =============================================================================

/// Map an OpenAI `finish_reason` to an Anthropic `stop_reason`.
///
/// Only "stop" has a counterpart ("end_turn"); every other value passes through.
#[must_use]
pub fn map_stop_reason(finish_reason: &str) -> String {
    match finish_reason {
        "stop" => "end_turn".to_string(),
        other => other.to_string(),
    }
}

/// Translate an upstream chat-completions response into a Messages response.
///
/// `requested_model` is the model the caller asked for and is always what the
/// caller gets back, whatever the upstream reports.
///
/// When there is no usable first choice the result is an assistant message
/// reading [`NO_RESPONSE_TEXT`] with `stop_reason` "error" and no usage.
#[must_use]
pub fn to_messages_response(response: &Value, requested_model: Option<&str>) -> MessagesResponse {
    let id = response
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ID);
    let model = requested_model.map(str::to_string);

    let Some(choice) = first_choice(response) else {
        return MessagesResponse::assistant_text(
            id,
            NO_RESPONSE_TEXT,
            model,
            ERROR_STOP_REASON,
            None,
        );
    };

    let text = choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or("");

    // A choice without a finish reason is treated as a normal stop.
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop");

    MessagesResponse::assistant_text(
        id,
        text,
        model,
        map_stop_reason(finish_reason),
        Some(usage_of(response)),
    )
}

/// The first element of `choices`, if it is an object.
fn first_choice(response: &Value) -> Option<&Map<String, Value>> {
    response.get("choices")?.as_array()?.first()?.as_object()
}

fn usage_of(response: &Value) -> MessagesUsage {
    let count = |field: &str| {
        response
            .get("usage")
            .and_then(|usage| usage.get(field))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };

    MessagesUsage {
        input_tokens: count("prompt_tokens"),
        output_tokens: count("completion_tokens"),
    }
}
