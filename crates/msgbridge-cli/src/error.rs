//! CLI-specific error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while composing the relay process.
#[derive(Debug, Error)]
pub enum CliError {
    /// The listener could not be bound. Fatal.
    #[error("Failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },

    /// The env file exists but could not be read. Non-fatal: it is logged
    /// and the credential is treated as missing.
    #[error("Failed to read env file {}: {reason}", path.display())]
    EnvFile { path: PathBuf, reason: String },
}

impl CliError {
    /// Map error to a process exit code (sysexits.h).
    ///
    /// Only fatal errors reach `process::exit`; today that is `BindFailed`.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::BindFailed { .. } => 69, // EX_UNAVAILABLE
            Self::EnvFile { .. } => 78,    // EX_CONFIG
        }
    }
}
