//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success};
use lc_core::config::{self, CheckConfig};

/// Print the effective configuration as TOML, candidate secrets masked
pub fn config_show(config_path: Option<&Path>, effective: &CheckConfig) -> Result<()> {
    let path = resolve_path(config_path);
    if path.exists() {
        print_info(&format!("Configuration file: {:?}", path));
    } else {
        print_info(&format!("No configuration file at {:?}, showing defaults", path));
    }
    println!();

    let shown = CheckConfig {
        api: effective.api.masked(),
        probe: effective.probe.clone(),
    };
    println!("{}", toml::to_string_pretty(&shown)?);

    Ok(())
}

/// Print the configuration file location
pub fn config_path(config_path: Option<&Path>) {
    println!("{}", resolve_path(config_path).display());
}

/// Write the default configuration
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<i32> {
    let path = resolve_path(config_path);

    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite");
        return Ok(1);
    }

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
            print_success(&format!("Created config directory: {:?}", dir));
        }
    }

    std::fs::write(&path, generate_default_config()?)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    print_success(&format!("Created configuration file: {:?}", path));
    Ok(0)
}

fn resolve_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Default configuration content
fn generate_default_config() -> Result<String> {
    let body = toml::to_string_pretty(&CheckConfig::default())
        .context("Failed to serialize default configuration")?;
    Ok(format!(
        "# limen-console configuration\n\
         #\n\
         # [api] candidate_passwords are tried in order when no --password is given.\n\
         # Durations are in seconds; fractions such as 0.5 are allowed.\n\n{}",
        body
    ))
}
