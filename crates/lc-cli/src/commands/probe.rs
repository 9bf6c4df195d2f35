//! Probe command implementation

use anyhow::Result;

use lc_core::config::ProbeConfig;
use lc_probe::ConnectionProbe;

use crate::output::{print_info, print_json, print_probe_report};

/// Probe a console endpoint directly, skipping the API stages
pub async fn probe_command(config: &ProbeConfig, url: &str, json: bool) -> Result<i32> {
    let probe = ConnectionProbe::new(config.clone());
    let report = probe.run(url).await;

    if json {
        print_json(&report)?;
    } else {
        print_info(&format!("Probed {}", report.url));
        if let Some(origin) = &report.origin {
            print_info(&format!("Origin: {}", origin));
        }
        print_probe_report(&report);
    }

    Ok(if report.is_success() { 0 } else { 1 })
}
