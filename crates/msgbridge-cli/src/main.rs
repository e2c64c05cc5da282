//! CLI entry point - the composition root.
//!
//! Parses configuration, installs logging, resolves the upstream credential,
//! binds the listener and runs the relay until SIGINT/SIGTERM.

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use msgbridge_cli::{API_KEY_VAR, Cli, bind, logging, relay_config, resolve_credential, shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (_log_guard, log_error) = logging::init(&cli.log_file, cli.verbose);
    if let Some(reason) = log_error {
        warn!("File logging disabled: {reason}");
    }

    info!("msgbridge starting...");
    info!("Mode: Anthropic Messages -> OpenAI chat completions");

    let credential = resolve_credential(std::env::var(API_KEY_VAR).ok(), &cli.env_file);
    if credential.api_key.is_none() {
        warn!("{API_KEY_VAR} not found in environment");
        warn!(
            "Set it in the environment or in {}; upstream calls will fail authentication",
            cli.env_file.display()
        );
    }

    let config = relay_config(&cli, credential.api_key);

    let listener = match bind(&cli.bind_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown::cancel_on_signal(cancel.clone()));

    msgbridge_proxy::serve(listener, config, cancel).await?;

    info!("Server closed");
    Ok(())
}
