use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    /// Base URL of the marketplace API, without a trailing slash.
    pub api_base_url: String,
    /// Directory for persistent client state (session SQLite database).
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Quiet period for typeahead debouncing.
    pub debounce: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("BAZAAR_API_URL")
            .context("BAZAAR_API_URL environment variable is required")?
            .trim_end_matches('/')
            .to_string();

        let state_dir = env::var("BAZAAR_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let request_timeout_secs = env::var("BAZAAR_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("BAZAAR_REQUEST_TIMEOUT_SECS must be a valid number")?;

        let debounce_ms = env::var("BAZAAR_DEBOUNCE_MS")
            .unwrap_or_else(|_| "250".to_string())
            .parse::<u64>()
            .context("BAZAAR_DEBOUNCE_MS must be a valid number")?;

        Ok(Config {
            api_base_url,
            state_dir,
            request_timeout: Duration::from_secs(request_timeout_secs),
            debounce: Duration::from_millis(debounce_ms),
        })
    }

    /// Path of the session database inside the state directory.
    pub fn session_db_path(&self) -> PathBuf {
        self.state_dir.join("session.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_db_path_joins_state_dir() {
        let config = Config {
            api_base_url: "http://localhost:3000".to_string(),
            state_dir: PathBuf::from("/tmp/bazaar"),
            request_timeout: Duration::from_secs(30),
            debounce: Duration::from_millis(250),
        };
        assert_eq!(config.session_db_path(), PathBuf::from("/tmp/bazaar/session.db"));
    }
}
