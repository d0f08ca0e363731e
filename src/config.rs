use crate::error::ConfigError;
use std::time::Duration;

pub const API_URL_VAR: &str = "HOUSING_CHAT_API_URL";
pub const SESSION_VAR: &str = "HOUSING_CHAT_SESSION";
pub const TIMEOUT_VAR: &str = "HOUSING_CHAT_TIMEOUT_SECS";

/// Connection settings for the property search service
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the search service, without trailing slash
    pub base_url: String,
    /// Fixed session identity sent as `user_id`
    pub session_id: String,
    /// Per-request timeout enforced by the HTTP client
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            session_id: "default".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Load from `HOUSING_CHAT_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(ConfigError::Empty { var: API_URL_VAR });
            }
            config.base_url = url.to_string();
        }

        if let Some(session) = lookup(SESSION_VAR) {
            let session = session.trim();
            if session.is_empty() {
                return Err(ConfigError::Empty { var: SESSION_VAR });
            }
            config.session_id = session.to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
