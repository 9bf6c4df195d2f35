//! Core domain types
//!
//! Every value here is produced by one stage of a check and handed, owned,
//! to the next. Nothing is cached across runs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::redact::preview_token;

/// Username/secret pair presented to the authentication endpoint
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    /// Login identity
    pub username: String,
    /// Secret (password)
    pub password: String,
}

impl Credential {
    /// Create a new credential
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer token issued by the authentication endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token (for the `Authorization` header only)
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Short, printable prefix of the token
    pub fn preview(&self) -> String {
        preview_token(&self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", self.preview())
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.preview())
    }
}

/// Identifier of a manageable resource (virtual machine UUID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(pub String);

impl ResourceHandle {
    /// Create a new resource handle
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw handle string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One entry of the resource listing
///
/// Only `uuid` is required; the remaining fields are shown in tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Resource handle
    pub uuid: ResourceHandle,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Power state as reported by the server (e.g. "Running")
    #[serde(default)]
    pub status: Option<String>,
}

/// Short-lived description of how to reach a resource's console
///
/// All fields are optional on the wire. Callers must tolerate a partial
/// descriptor but treat a missing `ws_url` as fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSessionDescriptor {
    /// Console transport endpoint (carries a token in its query string)
    #[serde(default)]
    pub ws_url: Option<String>,
    /// Application-level sub-protocol name (e.g. "vnc")
    #[serde(default)]
    pub protocol: Option<String>,
    /// Expiry timestamp, RFC 3339
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl ConsoleSessionDescriptor {
    /// The endpoint URL, treating an empty string as absent
    pub fn endpoint(&self) -> Option<&str> {
        self.ws_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_redacts_password() {
        let cred = Credential::new("admin", "0625");
        let debug = format!("{:?}", cred);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("0625"));
    }

    #[test]
    fn test_access_token_display_is_preview() {
        let token = AccessToken::new("a".repeat(64));
        assert_eq!(format!("{}", token), format!("{}...", "a".repeat(20)));
        assert_eq!(token.secret().len(), 64);
    }

    #[test]
    fn test_resource_summary_minimal() {
        let summary: ResourceSummary = serde_json::from_str(r#"{"uuid":"abc-123"}"#).unwrap();
        assert_eq!(summary.uuid.as_str(), "abc-123");
        assert!(summary.name.is_none());
    }

    #[test]
    fn test_resource_summary_ignores_extra_fields() {
        let json = r#"{"id":7,"uuid":"abc-123","name":"web-1","cpu":2,"memory":2048,"status":"Running"}"#;
        let summary: ResourceSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.name.as_deref(), Some("web-1"));
        assert_eq!(summary.status.as_deref(), Some("Running"));
    }

    #[test]
    fn test_descriptor_partial() {
        let descriptor: ConsoleSessionDescriptor =
            serde_json::from_str(r#"{"protocol":"vnc"}"#).unwrap();
        assert_eq!(descriptor.protocol.as_deref(), Some("vnc"));
        assert!(descriptor.endpoint().is_none());
    }

    #[test]
    fn test_descriptor_empty_endpoint_is_absent() {
        let descriptor = ConsoleSessionDescriptor {
            ws_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(descriptor.endpoint().is_none());
    }
}
