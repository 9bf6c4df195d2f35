//! Credential resolution
//!
//! Turns an identity plus an explicit secret, or an ordered list of candidate
//! secrets, into an access token. Candidates are tried strictly in order and
//! the scan stops at the first accepted one.

use lc_core::{AccessToken, Credential};

use crate::client::ConsoleApi;
use crate::error::ApiError;

/// Where the login secret comes from
#[derive(Clone)]
pub enum SecretSource {
    /// Exactly one attempt with this secret
    Explicit(String),
    /// Try each candidate in order until one is accepted
    Candidates(Vec<String>),
}

impl SecretSource {
    /// Secrets in attempt order
    fn secrets(&self) -> &[String] {
        match self {
            SecretSource::Explicit(secret) => std::slice::from_ref(secret),
            SecretSource::Candidates(candidates) => candidates,
        }
    }
}

impl std::fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::Explicit(_) => write!(f, "Explicit(<redacted>)"),
            SecretSource::Candidates(c) => write!(f, "Candidates({} secret(s))", c.len()),
        }
    }
}

/// Obtain an access token for `username`.
///
/// Every rejected attempt (non-success status, missing token, transport
/// error or timeout) moves on to the next secret. Returns
/// `ApiError::AuthenticationFailed` once all secrets are exhausted.
pub async fn resolve_token(
    api: &dyn ConsoleApi,
    username: &str,
    source: &SecretSource,
) -> Result<AccessToken, ApiError> {
    let secrets = source.secrets();

    for (index, secret) in secrets.iter().enumerate() {
        let credential = Credential::new(username, secret.as_str());
        match api.login(&credential).await {
            Ok(token) => {
                tracing::info!(
                    "Authenticated as '{}' (attempt {}/{})",
                    username,
                    index + 1,
                    secrets.len()
                );
                return Ok(token);
            }
            Err(e) => {
                tracing::debug!(
                    "Login attempt {}/{} for '{}' rejected: {}",
                    index + 1,
                    secrets.len(),
                    username,
                    e
                );
            }
        }
    }

    tracing::warn!("All {} login attempt(s) for '{}' failed", secrets.len(), username);
    Err(ApiError::AuthenticationFailed {
        username: username.to_string(),
        attempts: secrets.len(),
    })
}
