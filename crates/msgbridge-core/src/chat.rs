//! OpenAI chat-completions data models (the upstream-facing format).
//!
//! Upstream responses are not modelled here: they are read as raw JSON so a
//! structurally odd payload degrades instead of failing to parse. See
//! [`crate::translate::to_messages_response`].

use serde::{Deserialize, Serialize};

use crate::messages::MessageContent;

/// Request body sent to the upstream `/chat/completions` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model name; omitted when the caller did not supply one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Flat message list. A leading "system" entry carries the system prompt.
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user" or "assistant". Omitted when the caller sent none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self {
            role: Some(role.into()),
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new("system", content)
    }
}
