//! HTTP relay that accepts Anthropic Messages requests, forwards them to an
//! OpenAI-compatible upstream as chat completions, and translates the answer
//! back.
//!
//! The server is started with [`serve`] on a pre-bound listener; [`router`]
//! builds the same routes without binding, for embedding and tests.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used by the integration tests only
#[cfg(test)]
use http_body_util as _;

pub mod config;
pub mod error;
pub mod forward;
pub mod models;
pub mod server;

pub use config::{RelayConfig, UpstreamConfig};
pub use error::RelayError;
pub use server::{router, serve};
