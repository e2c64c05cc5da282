//! Relay bootstrap - the composition root.
//!
//! Resolves the upstream credential, builds the immutable `RelayConfig`, and
//! binds the listener. Nothing here touches the process environment after
//! startup; the env file is read into the config rather than exported.

use std::path::{Path, PathBuf};

use tokio::net::TcpListener;
use tracing::{info, warn};

use msgbridge_proxy::{RelayConfig, UpstreamConfig};

use crate::error::CliError;
use crate::parser::Cli;

/// Environment variable holding the upstream credential.
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// Where the upstream credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Set in the process environment.
    Environment,
    /// Read from a KEY=value file.
    EnvFile { path: PathBuf },
    /// Not found anywhere; upstream calls will fail authentication.
    Missing,
}

/// Outcome of credential resolution.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub api_key: Option<String>,
    pub source: CredentialSource,
}

impl std::fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

/// Keys read from an env file.
#[derive(Debug, Default)]
struct EnvFileKeys {
    api_key: Option<String>,
    /// Entries whose name contains `API_KEY`.
    keys_loaded: usize,
}

/// Resolve the upstream credential.
///
/// `env_value` is the current value of [`API_KEY_VAR`] in the process
/// environment. When it is unset or empty, `env_file` is consulted. A missing
/// or unreadable file is logged and yields [`CredentialSource::Missing`].
pub fn resolve_credential(env_value: Option<String>, env_file: &Path) -> ResolvedCredential {
    if let Some(api_key) = env_value.filter(|value| !value.is_empty()) {
        info!("Using {API_KEY_VAR} from environment");
        return ResolvedCredential {
            api_key: Some(api_key),
            source: CredentialSource::Environment,
        };
    }

    info!("Loading environment from: {}", env_file.display());
    let keys = match read_env_file(env_file) {
        Ok(Some(keys)) => keys,
        Ok(None) => {
            warn!("Environment file not found: {}", env_file.display());
            EnvFileKeys::default()
        }
        Err(e) => {
            warn!("{e}");
            EnvFileKeys::default()
        }
    };

    if keys.keys_loaded > 0 {
        info!(
            "Loaded {} API keys from {}",
            keys.keys_loaded,
            env_file.display()
        );
    }

    match keys.api_key {
        Some(api_key) => ResolvedCredential {
            api_key: Some(api_key),
            source: CredentialSource::EnvFile {
                path: env_file.to_path_buf(),
            },
        },
        None => ResolvedCredential {
            api_key: None,
            source: CredentialSource::Missing,
        },
    }
}

/// Read `KEY=value` pairs from `path`.
///
/// Returns `Ok(None)` when the file does not exist. Malformed lines are
/// skipped with a warning.
fn read_env_file(path: &Path) -> Result<Option<EnvFileKeys>, CliError> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(None),
        Err(e) => {
            return Err(CliError::EnvFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let mut keys = EnvFileKeys::default();
    for entry in entries {
        let (name, value) = match entry {
            Ok(pair) => pair,
            Err(e @ dotenvy::Error::LineParse(..)) => {
                warn!("Skipping line in {}: {e}", path.display());
                continue;
            }
            // Read errors repeat on every call, so stop at the first one.
            Err(e) => {
                return Err(CliError::EnvFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        if value.is_empty() {
            continue;
        }
        if name.contains("API_KEY") {
            keys.keys_loaded += 1;
        }
        if name == API_KEY_VAR {
            keys.api_key = Some(value);
        }
    }

    Ok(Some(keys))
}

/// Build the relay configuration from parsed arguments and the credential.
pub fn relay_config(cli: &Cli, api_key: Option<String>) -> RelayConfig {
    RelayConfig::new(UpstreamConfig::new(cli.upstream_url.clone(), api_key))
}

/// Bind the listener for the relay.
pub async fn bind(address: &str) -> Result<TcpListener, CliError> {
    TcpListener::bind(address)
        .await
        .map_err(|e| CliError::BindFailed {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_wins() {
        let resolved = resolve_credential(
            Some("sk-env".to_string()),
            Path::new("/nonexistent/msgbridge.env"),
        );
        assert_eq!(resolved.api_key.as_deref(), Some("sk-env"));
        assert_eq!(resolved.source, CredentialSource::Environment);
    }

    #[test]
    fn test_missing_file_is_not_fatal() {
        let resolved = resolve_credential(None, Path::new("/nonexistent/msgbridge.env"));
        assert_eq!(resolved.api_key, None);
        assert_eq!(resolved.source, CredentialSource::Missing);
    }

    #[test]
    fn test_empty_env_value_falls_through() {
        let resolved =
            resolve_credential(Some(String::new()), Path::new("/nonexistent/msgbridge.env"));
        assert_eq!(resolved.source, CredentialSource::Missing);
    }

    #[test]
    fn test_unreadable_env_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();

        // A directory opens but cannot be read as a file.
        let resolved = resolve_credential(None, dir.path());
        assert_eq!(resolved.api_key, None);
        assert_eq!(resolved.source, CredentialSource::Missing);

        let err = read_env_file(dir.path()).unwrap_err();
        assert!(matches!(err, CliError::EnvFile { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let resolved = ResolvedCredential {
            api_key: Some("sk-secret".to_string()),
            source: CredentialSource::Environment,
        };
        assert!(!format!("{resolved:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_bind_failure_reports_address() {
        let err = bind("256.0.0.1:0").await.unwrap_err();
        assert!(matches!(err, CliError::BindFailed { .. }));
        assert!(err.to_string().contains("256.0.0.1:0"));
        assert_eq!(err.exit_code(), 69);
    }
}
