//! Check command implementation

use anyhow::{Context, Result};
use serde::Serialize;

use lc_api::ApiClient;
use lc_core::config::CheckConfig;
use lc_core::redact::redact_parsed_url;
use lc_core::ResourceHandle;
use lc_probe::ConnectionProbe;

use super::LoginArgs;
use crate::check::{run_check, CheckOptions, CheckReport, Progress};
use crate::output::{
    print_error, print_info, print_json, print_probe_report, print_success, print_warning,
};

/// JSON shape of a finished check
#[derive(Serialize)]
struct JsonReport<'a> {
    success: bool,
    #[serde(flatten)]
    report: &'a CheckReport,
}

/// JSON shape of an aborted check
#[derive(Serialize)]
struct JsonFailure<'a> {
    success: bool,
    stage: &'a str,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

/// Execute the check command
pub async fn check_command(
    config: &CheckConfig,
    login: &LoginArgs,
    vm: Option<String>,
    json: bool,
) -> Result<i32> {
    let client = ApiClient::new(&config.api).context("Failed to create API client")?;
    let probe = ConnectionProbe::new(config.probe.clone());

    let username = login.username(&config.api);
    let options = CheckOptions {
        username: username.clone(),
        secrets: login.secrets(&config.api),
        vm: vm.map(ResourceHandle::from),
    };

    if !json {
        print_info(&format!(
            "Checking console access on {} as '{}'",
            client.base_url(),
            username
        ));
    }

    let result = run_check(&client, &probe, &options, |progress| {
        if !json {
            report_progress(&username, progress);
        }
    })
    .await;

    match result {
        Ok(report) => {
            if json {
                print_json(&JsonReport {
                    success: report.is_success(),
                    report: &report,
                })?;
            } else {
                print_probe_report(&report.probe);
            }
            Ok(report.exit_code())
        }
        Err(e) => {
            if json {
                print_json(&JsonFailure {
                    success: false,
                    stage: e.stage(),
                    error: e.to_string(),
                    body: e.response_body(),
                })?;
            } else {
                print_error(&e.to_string());
                if let Some(body) = e.response_body() {
                    print_warning(&format!("  Response: {}", body));
                }
            }
            Ok(e.exit_code())
        }
    }
}

fn report_progress(username: &str, progress: Progress<'_>) {
    match progress {
        Progress::Authenticated(token) => print_success(&format!(
            "Authenticated as '{}' (token {})",
            username,
            token.preview()
        )),
        Progress::Selected { vm, discovered } => {
            if discovered {
                print_success(&format!("Selected VM {}", vm));
            } else {
                print_success(&format!("Using VM {}", vm));
            }
        }
        Progress::Negotiated(descriptor) => print_success(&format!(
            "Console session negotiated (protocol {}, expires {})",
            descriptor.protocol.as_deref().unwrap_or("-"),
            descriptor.expires_at.as_deref().unwrap_or("-"),
        )),
        Progress::Probing(target) => {
            print_info(&format!("Probing {}", redact_parsed_url(target.url())));
            if let Some(origin) = target.handshake_origin() {
                print_info(&format!("Origin: {}", origin));
            }
        }
    }
}
