//! Management API errors

use thiserror::Error;

/// Errors raised while talking to the management API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// Login succeeded at the HTTP level but carried no token
    #[error("Login response did not contain an access token")]
    MissingToken,

    /// Base URL cannot be extended with API paths
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Every credential attempt was rejected
    #[error("Authentication failed for '{username}' after {attempts} attempt(s)")]
    AuthenticationFailed { username: String, attempts: usize },

    /// Resource listing failed or was empty
    #[error("No virtual machines available: {0}")]
    NoResourcesAvailable(String),

    /// Console negotiation returned a non-success status
    #[error("Console negotiation failed with HTTP {status}")]
    SessionNegotiationFailed { status: u16, body: String },
}

impl ApiError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. }
            | ApiError::SessionNegotiationFailed { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body carried by the error, for display only
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::UnexpectedStatus { body, .. }
            | ApiError::SessionNegotiationFailed { body, .. } => Some(body),
            _ => None,
        }
    }
}
