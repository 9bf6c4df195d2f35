//! Resource discovery

use lc_core::{AccessToken, ResourceHandle};

use crate::client::ConsoleApi;
use crate::error::ApiError;

/// Pick the first resource the server returns.
///
/// One listing request, no pagination, no filtering. A failed request and an
/// empty list both map to `ApiError::NoResourcesAvailable`.
pub async fn first_resource(
    api: &dyn ConsoleApi,
    token: &AccessToken,
) -> Result<ResourceHandle, ApiError> {
    let resources = api.list_resources(token).await.map_err(|e| {
        tracing::warn!("Resource listing failed: {}", e);
        ApiError::NoResourcesAvailable(format!("listing failed: {}", e))
    })?;

    let first = resources
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NoResourcesAvailable("resource list is empty".into()))?;

    tracing::info!(
        "Selected VM {} ({})",
        first.uuid,
        first.name.as_deref().unwrap_or("unnamed")
    );
    Ok(first.uuid)
}
