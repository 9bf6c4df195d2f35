//! Probe target parsing and origin derivation

use thiserror::Error;
use url::Url;

/// Reasons an endpoint cannot be probed at all
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    /// Endpoint is not a URL
    #[error("Invalid endpoint URL: {0}")]
    Parse(#[from] url::ParseError),

    /// Scheme is neither `ws` nor `wss`
    #[error("Unsupported scheme '{0}' (expected ws or wss)")]
    UnsupportedScheme(String),

    /// URL has no host component
    #[error("Endpoint URL has no host")]
    MissingHost,
}

/// A validated WebSocket endpoint
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    url: Url,
    secure: bool,
}

impl ProbeTarget {
    /// Parse and validate an endpoint URL
    pub fn parse(endpoint: &str) -> Result<Self, TargetError> {
        let url = Url::parse(endpoint)?;
        let secure = match url.scheme() {
            "wss" => true,
            "ws" => false,
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        };
        if url.host_str().map(str::is_empty).unwrap_or(true) {
            return Err(TargetError::MissingHost);
        }
        Ok(Self { url, secure })
    }

    /// The endpoint URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Origin derived from scheme and host: `wss` maps to `https`, `ws` to
    /// `http`, an explicit port is kept.
    pub fn origin(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}://{}:{}", scheme, host, port),
            None => format!("{}://{}", scheme, host),
        }
    }

    /// Origin to present during the handshake: only over TLS
    pub fn handshake_origin(&self) -> Option<String> {
        self.secure.then(|| self.origin())
    }
}
