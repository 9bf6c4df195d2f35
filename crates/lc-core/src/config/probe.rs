//! Connection probe configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Timing bounds for one probe run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Upper bound on the WebSocket opening handshake
    #[serde(with = "duration_secs")]
    pub handshake_timeout: Duration,

    /// How long to wait for the first inbound message.
    ///
    /// Silence for the whole window counts as a healthy idle connection.
    #[serde(with = "duration_secs")]
    pub message_wait: Duration,

    /// How long to keep a stable connection open before closing it
    #[serde(with = "duration_secs")]
    pub hold_open: Duration,

    /// Upper bound on the closing handshake
    #[serde(with = "duration_secs")]
    pub close_timeout: Duration,

    /// Number of characters kept in a message preview
    pub preview_chars: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(5),
            message_wait: Duration::from_secs(3),
            hold_open: Duration::from_secs(1),
            close_timeout: Duration::from_secs(5),
            preview_chars: 80,
        }
    }
}
