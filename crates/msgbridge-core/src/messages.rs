//! Anthropic Messages API data models (the caller-facing format).
//!
//! Only the fields the relay reads are modelled. Anything else in an inbound
//! request (tools, metadata, stop sequences) is ignored during parsing.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Request Types
// =============================================================================

/// Request to the `/v1/messages` endpoint.
///
/// Every field is optional on the wire; a body of `{}` parses to a request
/// with no model and no messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Model name requested by the caller. Echoed back unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Top-level system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<MessageContent>,
    /// Conversation turns, in order.
    #[serde(default)]
    pub messages: Vec<MessageParam>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Whether the caller asked for a streamed response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// A single conversation turn.
///
/// Neither field is required: a turn without a role is forwarded without
/// one, and absent or `null` content becomes empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageParam {
    /// Role: "user" or "assistant".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: MessageContent,
}

/// Message or system content.
///
/// Plain strings are the common case. Arrays of content blocks are kept as
/// raw JSON and handed to the upstream verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<serde_json::Value>),
}

impl MessageContent {
    /// True for `""` and `[]`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Blocks(blocks) => blocks.is_empty(),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from the `/v1/messages` endpoint (non-streaming).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    /// Always "message".
    pub r#type: String,
    /// Always "assistant".
    pub role: String,
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub stop_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<MessagesUsage>,
}

impl MessagesResponse {
    /// Build an assistant message holding a single text block.
    pub fn assistant_text(
        id: impl Into<String>,
        text: impl Into<String>,
        model: Option<String>,
        stop_reason: impl Into<String>,
        usage: Option<MessagesUsage>,
    ) -> Self {
        Self {
            id: id.into(),
            r#type: "message".to_string(),
            role: "assistant".to_string(),
            content: vec![ContentBlock::Text { text: text.into() }],
            model,
            stop_reason: stop_reason.into(),
            usage,
        }
    }

    /// Concatenated text of all text blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect()
    }
}

/// A content block in an assistant response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
