//! End-to-end console check
//!
//! Runs the four stages strictly in order and stops at the first failure:
//! credential resolution, VM selection, console negotiation, connection probe.
//! Each stage hands an owned value to the next.

use serde::Serialize;
use thiserror::Error;

use lc_api::{first_resource, negotiate_console, resolve_token, ApiError, ConsoleApi, SecretSource};
use lc_core::{AccessToken, ConsoleSessionDescriptor, ResourceHandle};
use lc_probe::{ConnectionProbe, ProbeReport, ProbeTarget, TargetError};

/// Inputs for one check run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Identity used for login
    pub username: String,
    /// Explicit password or candidate list
    pub secrets: SecretSource,
    /// Skip discovery and target this VM
    pub vm: Option<ResourceHandle>,
}

/// Stage that aborted a check
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Authentication failed: {0}")]
    Authentication(ApiError),

    #[error("{0}")]
    Discovery(ApiError),

    #[error("{0}")]
    Negotiation(ApiError),

    #[error("Console descriptor has no endpoint URL")]
    MissingEndpoint,

    #[error("Console endpoint cannot be probed: {0}")]
    InvalidEndpoint(TargetError),
}

impl CheckError {
    /// Short stage name for reports
    pub fn stage(&self) -> &'static str {
        match self {
            CheckError::Authentication(_) => "authentication",
            CheckError::Discovery(_) => "discovery",
            CheckError::Negotiation(_) => "negotiation",
            CheckError::MissingEndpoint | CheckError::InvalidEndpoint(_) => "endpoint",
        }
    }

    /// Every aborted stage exits with 1
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Non-empty body of a failed negotiation response
    pub fn response_body(&self) -> Option<&str> {
        match self {
            CheckError::Negotiation(e) => e.body().map(str::trim).filter(|b| !b.is_empty()),
            _ => None,
        }
    }
}

/// Progress notifications emitted as each stage completes
#[derive(Debug)]
pub enum Progress<'a> {
    Authenticated(&'a AccessToken),
    Selected {
        vm: &'a ResourceHandle,
        discovered: bool,
    },
    Negotiated(&'a ConsoleSessionDescriptor),
    Probing(&'a ProbeTarget),
}

/// Everything a successful pipeline run produced
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub username: String,
    /// Leading characters of the access token
    pub token_preview: String,
    pub vm: ResourceHandle,
    pub protocol: Option<String>,
    pub expires_at: Option<String>,
    pub probe: ProbeReport,
}

impl CheckReport {
    /// Whether the probe found the console stable
    pub fn is_success(&self) -> bool {
        self.probe.is_success()
    }

    /// Process exit status for this report
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Run the full check against `api`, probing with `probe`.
///
/// `on_progress` is called once per completed stage. A returned report may
/// still describe a failed probe; see [`CheckReport::is_success`].
pub async fn run_check<F>(
    api: &dyn ConsoleApi,
    probe: &ConnectionProbe,
    options: &CheckOptions,
    mut on_progress: F,
) -> Result<CheckReport, CheckError>
where
    F: FnMut(Progress<'_>),
{
    let token = resolve_token(api, &options.username, &options.secrets)
        .await
        .map_err(CheckError::Authentication)?;
    on_progress(Progress::Authenticated(&token));

    let (vm, discovered) = match &options.vm {
        Some(vm) => {
            tracing::info!("Using VM {} from command line", vm);
            (vm.clone(), false)
        }
        None => (
            first_resource(api, &token)
                .await
                .map_err(CheckError::Discovery)?,
            true,
        ),
    };
    on_progress(Progress::Selected {
        vm: &vm,
        discovered,
    });

    let descriptor = negotiate_console(api, &token, &vm)
        .await
        .map_err(CheckError::Negotiation)?;
    on_progress(Progress::Negotiated(&descriptor));

    let endpoint = descriptor.endpoint().ok_or(CheckError::MissingEndpoint)?;
    let target = ProbeTarget::parse(endpoint).map_err(CheckError::InvalidEndpoint)?;
    on_progress(Progress::Probing(&target));

    let report = probe.run(endpoint).await;
    tracing::info!("Probe finished in {} ms: {}", report.elapsed_ms, report.outcome);

    Ok(CheckReport {
        username: options.username.clone(),
        token_preview: token.preview(),
        vm,
        protocol: descriptor.protocol,
        expires_at: descriptor.expires_at,
        probe: report,
    })
}
