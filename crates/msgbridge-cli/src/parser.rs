//! Command-line parser.
//!
//! Every option can also be set through an environment variable so the
//! relay runs unchanged in a container.

use std::path::PathBuf;

use clap::Parser;

use msgbridge_proxy::config::DEFAULT_UPSTREAM_URL;

/// Default bind host: all interfaces.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Relay Anthropic Messages requests to an OpenAI-compatible provider.
#[derive(Debug, Parser)]
#[command(name = "msgbridge")]
#[command(about = "Translate Anthropic Messages requests into OpenAI chat completions")]
#[command(version)]
pub struct Cli {
    /// Host to bind to
    #[arg(long, env = "MSGBRIDGE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "MSGBRIDGE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Upstream chat-completions endpoint
    #[arg(long = "upstream-url", env = "MSGBRIDGE_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// KEY=value file read when the API key is not in the environment
    #[arg(long = "env-file", env = "MSGBRIDGE_ENV_FILE", default_value = ".env")]
    pub env_file: PathBuf,

    /// Append-only log file
    #[arg(long = "log-file", env = "MSGBRIDGE_LOG_FILE", default_value = "/tmp/msgbridge.log")]
    pub log_file: PathBuf,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
