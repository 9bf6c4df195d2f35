//! VM listing command implementation

use anyhow::{Context, Result};

use lc_api::{resolve_token, ApiClient, ConsoleApi};
use lc_core::config::ApiConfig;

use super::LoginArgs;
use crate::output::{format_vms, print_error, print_json};

/// Authenticate and list the VMs a check could target
pub async fn vms_command(config: &ApiConfig, login: &LoginArgs, json: bool) -> Result<i32> {
    let client = ApiClient::new(config).context("Failed to create API client")?;

    let token = match resolve_token(&client, &login.username(config), &login.secrets(config)).await
    {
        Ok(token) => token,
        Err(e) => {
            print_error(&format!("Authentication failed: {}", e));
            return Ok(1);
        }
    };

    let vms = match client.list_resources(&token).await {
        Ok(vms) => vms,
        Err(e) => {
            print_error(&format!("Failed to list VMs: {}", e));
            return Ok(1);
        }
    };

    if json {
        print_json(&vms)?;
    } else {
        println!("{}", format_vms(&vms));
    }

    Ok(0)
}
