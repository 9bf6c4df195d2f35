//! Configuration management for limen-console

mod api;
mod probe;
pub mod serde_utils;

pub use api::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_CANDIDATE_PASSWORDS, DEFAULT_USERNAME};
pub use probe::ProbeConfig;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for every configured timeout or wait
pub const MAX_DURATION: Duration = Duration::from_secs(3600);

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Management API settings
    pub api: ApiConfig,
    /// Connection probe settings
    pub probe: ProbeConfig,
}

impl CheckConfig {
    /// Load from an explicit path, or from the default path if it exists.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file silently yields the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => load_config(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    load_config(&path)
                } else {
                    tracing::debug!("No config file at {:?}, using defaults", path);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.parsed_base_url()?;
        if self.api.username.trim().is_empty() {
            return Err(ConfigError::Invalid("api.username must not be empty".into()));
        }
        if self.probe.preview_chars == 0 {
            return Err(ConfigError::Invalid("probe.preview_chars must be at least 1".into()));
        }

        let durations = [
            ("api.request_timeout", self.api.request_timeout),
            ("probe.handshake_timeout", self.probe.handshake_timeout),
            ("probe.message_wait", self.probe.message_wait),
            ("probe.hold_open", self.probe.hold_open),
            ("probe.close_timeout", self.probe.close_timeout),
        ];
        for (name, value) in durations {
            if value > MAX_DURATION {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at most {} seconds",
                    name,
                    MAX_DURATION.as_secs()
                )));
            }
        }
        Ok(())
    }
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("limen-console")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}
