//! Wire types and translation between the Anthropic Messages format and the
//! OpenAI chat-completions format.
//!
//! Everything in this crate is pure: no I/O, no shared state. The HTTP relay
//! in `msgbridge-proxy` parses bodies into these types, calls the translator,
//! and serializes the result.

#![deny(unused_crate_dependencies)]

pub mod chat;
pub mod messages;
pub mod translate;

// Re-export commonly used types for convenience
pub use chat::{ChatCompletionRequest, ChatMessage};
pub use messages::{
    ContentBlock, MessageContent, MessageParam, MessagesRequest, MessagesResponse, MessagesUsage,
};
pub use translate::{
    DEFAULT_MAX_TOKENS, DEFAULT_STREAM, DEFAULT_TEMPERATURE, NO_RESPONSE_TEXT, SamplingParams,
    map_stop_reason, to_chat_completion, to_messages_response,
};
