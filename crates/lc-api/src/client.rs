//! HTTP client for the management API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use lc_core::config::ApiConfig;
use lc_core::{AccessToken, ConsoleSessionDescriptor, Credential, ResourceHandle, ResourceSummary};

use crate::error::ApiError;

/// Abstraction over the management API endpoints used by a check
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Exchange a credential for an access token (single attempt)
    async fn login(&self, credential: &Credential) -> Result<AccessToken, ApiError>;

    /// List manageable resources in server order
    async fn list_resources(&self, token: &AccessToken) -> Result<Vec<ResourceSummary>, ApiError>;

    /// Request a console session descriptor for a resource
    async fn console_descriptor(
        &self,
        token: &AccessToken,
        handle: &ResourceHandle,
    ) -> Result<ConsoleSessionDescriptor, ApiError>;
}

/// Body of a successful login response
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// reqwest-backed [`ConsoleApi`] implementation
pub struct ApiClient {
    /// Base URL, always ending in `/`
    base_url: Url,
    /// Shared HTTP client carrying the request timeout
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut base_url = config
            .parsed_base_url()
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { base_url, http })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments below the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turn a non-success response into `UnexpectedStatus`
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ConsoleApi for ApiClient {
    async fn login(&self, credential: &Credential) -> Result<AccessToken, ApiError> {
        let url = self.endpoint(&["api", "auth", "login"])?;
        tracing::debug!("POST {} as '{}'", url, credential.username);

        let response = self.http.post(url).json(credential).send().await?;
        let response = Self::check_status(response).await?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        match body.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let token = AccessToken::new(token);
                tracing::debug!(
                    "Login accepted (token: {}, expires_in: {:?})",
                    token.preview(),
                    body.expires_in
                );
                Ok(token)
            }
            None => Err(ApiError::MissingToken),
        }
    }

    async fn list_resources(&self, token: &AccessToken) -> Result<Vec<ResourceSummary>, ApiError> {
        let url = self.endpoint(&["api", "vms"])?;
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).bearer_auth(token.secret()).send().await?;
        let response = Self::check_status(response).await?;

        let entries: Vec<Value> = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let resources = parse_listing(entries)?;
        tracing::debug!("Listed {} resource(s)", resources.len());
        Ok(resources)
    }

    async fn console_descriptor(
        &self,
        token: &AccessToken,
        handle: &ResourceHandle,
    ) -> Result<ConsoleSessionDescriptor, ApiError> {
        let url = self.endpoint(&["api", "vms", handle.as_str(), "console"])?;
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).bearer_auth(token.secret()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::SessionNegotiationFailed {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Convert raw listing entries, keeping server order.
///
/// Only the first entry decides whether a check can proceed, so it must carry
/// a string `uuid`. Later entries without one are skipped.
fn parse_listing(entries: Vec<Value>) -> Result<Vec<ResourceSummary>, ApiError> {
    let mut resources = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match summary_from_entry(entry) {
            Some(summary) => resources.push(summary),
            None if index == 0 => {
                return Err(ApiError::InvalidResponse(
                    "first VM entry has no string uuid".into(),
                ))
            }
            None => tracing::debug!("Skipping VM entry {} without a uuid", index),
        }
    }
    Ok(resources)
}

fn summary_from_entry(entry: &Value) -> Option<ResourceSummary> {
    let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
    Some(ResourceSummary {
        uuid: ResourceHandle::new(text("uuid")?),
        name: text("name"),
        status: text("status"),
    })
}
