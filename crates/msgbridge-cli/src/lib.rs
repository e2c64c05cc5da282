//! Composition root for the msgbridge relay binary.
//!
//! Everything process-scoped is resolved here once: command-line and
//! environment configuration, the upstream credential, logging, the bound
//! listener and signal handling. The result is handed to
//! `msgbridge_proxy::serve` as an immutable `RelayConfig`.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs binary
use anyhow as _;

pub mod bootstrap;
pub mod error;
pub mod logging;
pub mod parser;
pub mod shutdown;

// Re-export primary types for convenient access
pub use bootstrap::{
    API_KEY_VAR, CredentialSource, ResolvedCredential, bind, relay_config, resolve_credential,
};
pub use error::CliError;
pub use parser::Cli;
