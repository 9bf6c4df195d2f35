//! Redaction helpers for secrets that end up in logs and reports
//!
//! Console URLs carry a short-lived bearer token in their query string
//! (`?token=...`). Anything printed or logged goes through these helpers.

use url::Url;

/// Number of token characters kept when previewing a token
pub const TOKEN_PREVIEW_CHARS: usize = 20;

/// Query parameters whose values are replaced when a URL is redacted
const SENSITIVE_PARAMS: &[&str] = &["token", "access_token", "password"];

/// Preview a secret by keeping its first `TOKEN_PREVIEW_CHARS` characters.
pub fn preview_token(token: &str) -> String {
    let mut chars = token.chars();
    let head: String = chars.by_ref().take(TOKEN_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Redact sensitive query parameters of a URL.
///
/// Strings that do not parse as URLs are returned unchanged.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => redact_parsed_url(&url),
        Err(_) => raw.to_string(),
    }
}

/// Redact sensitive query parameters of an already-parsed URL.
pub fn redact_parsed_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if SENSITIVE_PARAMS.iter().any(|p| k.eq_ignore_ascii_case(p)) {
                (k.into_owned(), "REDACTED".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
