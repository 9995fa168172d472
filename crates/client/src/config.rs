//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KIRANA_API_BASE_URL` - Backend base URL (default: `http://localhost:8080`)
//! - `KIRANA_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds; unset
//!   means requests wait on the transport layer
//! - `KIRANA_SESSION_FILE` - Path of the persisted session file (default:
//!   `$HOME/.kirana/session.json`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const SESSION_FILE_NAME: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Cannot determine a session file location; set KIRANA_SESSION_FILE")]
    NoSessionFile,
}

/// Kirana client configuration.
#[derive(Debug, Clone)]
pub struct KiranaConfig {
    /// Base URL of the Kirana REST backend.
    pub base_url: Url,
    /// Per-request timeout; `None` waits on the transport layer.
    pub request_timeout: Option<Duration>,
    /// Where the session token and display user are persisted.
    pub session_file: PathBuf,
}

impl KiranaConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable, or if
    /// no session file location can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_env_or_default("KIRANA_API_BASE_URL", DEFAULT_BASE_URL);
        let base_url = parse_base_url(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("KIRANA_API_BASE_URL".to_owned(), e))?;

        let request_timeout = match std::env::var("KIRANA_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "KIRANA_REQUEST_TIMEOUT_SECS".to_owned(),
                        e.to_string(),
                    )
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let session_file = match std::env::var("KIRANA_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file().ok_or(ConfigError::NoSessionFile)?,
        };

        Ok(Self {
            base_url,
            request_timeout,
            session_file,
        })
    }
}

/// Parse and normalize the backend base URL.
///
/// A trailing slash is required for `Url::join` to treat the last path
/// segment as a directory, so one is appended if missing.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("URL cannot be a base".to_owned());
    }
    Ok(url)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Default session file under the user's home directory.
fn default_session_file() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".kirana").join(SESSION_FILE_NAME))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("http://localhost:8080").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_parse_base_url_keeps_path() {
        let url = parse_base_url("https://api.example.com/kirana").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/kirana/");

        // Joins land under the path, not the host root
        let joined = url.join("cart").unwrap();
        assert_eq!(joined.as_str(), "https://api.example.com/kirana/cart");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:user@example.com").is_err());
    }
}
