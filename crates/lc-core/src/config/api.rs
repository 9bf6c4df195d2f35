//! Management API configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::serde_utils::duration_secs;
use crate::error::ConfigError;

/// Default management API address
pub const DEFAULT_BASE_URL: &str = "http://localhost:18443";

/// Default login identity
pub const DEFAULT_USERNAME: &str = "admin";

/// Secrets tried in order when no password is supplied
pub const DEFAULT_CANDIDATE_PASSWORDS: &[&str] = &["0625", "admin", "password"];

/// Settings for talking to the management API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the management API (scheme, host, port)
    pub base_url: String,

    /// Identity used for login
    pub username: String,

    /// Ordered candidate secrets, used only when no password is given
    pub candidate_passwords: Vec<String>,

    /// Per-request timeout
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            candidate_passwords: DEFAULT_CANDIDATE_PASSWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ApiConfig {
    /// Parse `base_url`
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    /// Copy suitable for printing: candidate secrets are masked
    pub fn masked(&self) -> Self {
        Self {
            candidate_passwords: self
                .candidate_passwords
                .iter()
                .map(|p| "*".repeat(p.chars().count().max(1)))
                .collect(),
            ..self.clone()
        }
    }
}
