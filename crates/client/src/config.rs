use std::path::PathBuf;
use std::time::Duration;

use crate::token_store::TOKEN_KEY;

/// Backend used when `SAASPROBE_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Period between status polls of a non-terminal project.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Directory (under the platform config dir) holding client state.
const APP_DIR: &str = "saasprobe";

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// File holding the persisted access token.
    pub token_path: PathBuf,
    /// Period between status polls.
    pub poll_interval: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} is not a valid URL: '{value}'")]
    InvalidUrl { var: &'static str, value: String },

    #[error("Cannot locate a config directory; set SAASPROBE_TOKEN_PATH")]
    NoConfigDir,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                                 |
    /// |----------------------------------|-----------------------------------------|
    /// | `SAASPROBE_API_URL`              | `http://localhost:8000`                 |
    /// | `SAASPROBE_TOKEN_PATH`           | `<config dir>/saasprobe/access_token`   |
    /// | `SAASPROBE_POLL_INTERVAL_SECS`   | `10`                                    |
    /// | `SAASPROBE_REQUEST_TIMEOUT_SECS` | `30`                                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary
    /// key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = normalize_api_url(
            "SAASPROBE_API_URL",
            &lookup("SAASPROBE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
        )?;

        let token_path = match lookup("SAASPROBE_TOKEN_PATH").filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_token_path()?,
        };

        let poll_interval = Duration::from_secs(parse_positive(
            "SAASPROBE_POLL_INTERVAL_SECS",
            lookup("SAASPROBE_POLL_INTERVAL_SECS"),
            DEFAULT_POLL_INTERVAL_SECS,
        )?);

        let request_timeout = Duration::from_secs(parse_positive(
            "SAASPROBE_REQUEST_TIMEOUT_SECS",
            lookup("SAASPROBE_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        Ok(Self {
            api_url,
            token_path,
            poll_interval,
            request_timeout,
        })
    }

    /// Override the backend URL (e.g. from a command-line flag).
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url("--api-url", api_url)?;
        Ok(self)
    }
}

fn default_token_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(TOKEN_KEY))
        .ok_or(ConfigError::NoConfigDir)
}

fn normalize_api_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidUrl {
            var,
            value: raw.to_string(),
        }),
    }
}

fn parse_positive(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value: raw }),
    }
}
