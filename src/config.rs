//! Runtime configuration parsed from environment variables.

use crate::api::client::BearerToken;

pub const DEFAULT_API_BASE_URL: &str = "https://story-api.dicoding.dev/v1";
pub const DEFAULT_API_TOKEN_ENV: &str = "STORY_API_TOKEN";
pub const DEFAULT_DB_URL: &str = "sqlite://storysync.db";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The environment variable holding the bearer credential is not set.
    #[error("missing API token: env var {var} not set")]
    MissingToken { var: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken { .. } => "E_MISSING_TOKEN",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    /// Name of the env var that holds the bearer credential.
    pub api_token_env: String,
    pub db_url: String,
    pub db_max_connections: u32,
    pub timeouts: ApiTimeouts,
    pub probe_interval_ms: u64,
    pub notice_capacity: usize,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `STORY_API_BASE_URL`: default `https://story-api.dicoding.dev/v1`
    /// - `STORY_API_TOKEN_ENV`: env var holding the bearer token, default `STORY_API_TOKEN`
    /// - `STORY_DB_URL`: default `sqlite://storysync.db`
    /// - `STORY_DB_MAX_CONNECTIONS`: default 1
    /// - `STORY_REQUEST_TIMEOUT_SECS`: default 30
    /// - `STORY_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STORY_PROBE_INTERVAL_MS`: default 5000
    /// - `STORY_NOTICE_CAPACITY`: default 64
    #[must_use]
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("STORY_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let api_token_env = std::env::var("STORY_API_TOKEN_ENV").unwrap_or_else(|_| DEFAULT_API_TOKEN_ENV.to_string());
        let db_url = std::env::var("STORY_DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string());
        let timeouts = ApiTimeouts {
            request_secs: env_parse("STORY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("STORY_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Self {
            api_base_url,
            api_token_env,
            db_url,
            db_max_connections: env_parse("STORY_DB_MAX_CONNECTIONS", crate::db::DEFAULT_DB_MAX_CONNECTIONS).max(1),
            timeouts,
            // Zero would panic in `tokio::time::interval` and `mpsc::channel`.
            probe_interval_ms: env_parse("STORY_PROBE_INTERVAL_MS", DEFAULT_PROBE_INTERVAL_MS).max(1),
            notice_capacity: env_parse("STORY_NOTICE_CAPACITY", DEFAULT_NOTICE_CAPACITY).max(1),
        }
    }

    /// Read the bearer credential from the configured env var.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] if the variable is unset or empty.
    pub fn api_token(&self) -> Result<BearerToken, ConfigError> {
        match std::env::var(&self.api_token_env) {
            Ok(token) if !token.is_empty() => Ok(BearerToken::new(token)),
            _ => Err(ConfigError::MissingToken { var: self.api_token_env.clone() }),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
