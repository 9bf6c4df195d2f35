//! Console session negotiation

use lc_core::redact::redact_url;
use lc_core::{AccessToken, ConsoleSessionDescriptor, ResourceHandle};

use crate::client::ConsoleApi;
use crate::error::ApiError;

/// Request a console session descriptor for `handle`.
///
/// A non-success status surfaces as `ApiError::SessionNegotiationFailed`
/// with the exact status and raw body. A successful response may still be a
/// partial descriptor; checking for the endpoint is left to the caller.
pub async fn negotiate_console(
    api: &dyn ConsoleApi,
    token: &AccessToken,
    handle: &ResourceHandle,
) -> Result<ConsoleSessionDescriptor, ApiError> {
    let descriptor = api.console_descriptor(token, handle).await?;

    tracing::info!(
        "Console descriptor for {}: url={}, protocol={}, expires_at={}",
        handle,
        descriptor
            .ws_url
            .as_deref()
            .map(redact_url)
            .unwrap_or_else(|| "-".to_string()),
        descriptor.protocol.as_deref().unwrap_or("-"),
        descriptor.expires_at.as_deref().unwrap_or("-"),
    );
    Ok(descriptor)
}
