//! Scripted `ConsoleApi` used by unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lc_core::{AccessToken, ConsoleSessionDescriptor, Credential, ResourceHandle, ResourceSummary};

use crate::client::ConsoleApi;
use crate::error::ApiError;

/// Accepts exactly one password and replays canned listing/console answers.
///
/// `Err(status)` entries are returned as the matching HTTP failure.
pub(crate) struct ScriptedApi {
    pub valid_password: Option<String>,
    pub resources: Result<Vec<ResourceSummary>, u16>,
    pub console: Result<ConsoleSessionDescriptor, u16>,
    attempts: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    console_calls: AtomicUsize,
}

impl ScriptedApi {
    pub(crate) fn accepting(password: Option<&str>) -> Self {
        Self {
            valid_password: password.map(str::to_string),
            resources: Ok(Vec::new()),
            console: Ok(ConsoleSessionDescriptor::default()),
            attempts: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            console_calls: AtomicUsize::new(0),
        }
    }

    /// Passwords tried so far, in order
    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn console_calls(&self) -> usize {
        self.console_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsoleApi for ScriptedApi {
    async fn login(&self, credential: &Credential) -> Result<AccessToken, ApiError> {
        self.attempts.lock().unwrap().push(credential.password.clone());
        if self.valid_password.as_deref() == Some(credential.password.as_str()) {
            Ok(AccessToken::new(format!("token-for-{}", credential.password)))
        } else {
            Err(ApiError::UnexpectedStatus {
                status: 401,
                body: "invalid credentials".into(),
            })
        }
    }

    async fn list_resources(&self, _token: &AccessToken) -> Result<Vec<ResourceSummary>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match &self.resources {
            Ok(resources) => Ok(resources.clone()),
            Err(status) => Err(ApiError::UnexpectedStatus {
                status: *status,
                body: String::new(),
            }),
        }
    }

    async fn console_descriptor(
        &self,
        _token: &AccessToken,
        _handle: &ResourceHandle,
    ) -> Result<ConsoleSessionDescriptor, ApiError> {
        self.console_calls.fetch_add(1, Ordering::SeqCst);
        match &self.console {
            Ok(descriptor) => Ok(descriptor.clone()),
            Err(status) => Err(ApiError::SessionNegotiationFailed {
                status: *status,
                body: r#"{"error":"scripted failure"}"#.into(),
            }),
        }
    }
}
