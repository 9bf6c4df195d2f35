//! CLI command implementations
//!
//! Each command returns the process exit code. `Err` is reserved for setup
//! problems (unusable configuration, client construction) and maps to 2.

mod check;
mod config;
mod probe;
mod vms;

pub use check::check_command;
pub use config::{config_init, config_path, config_show};
pub use probe::probe_command;
pub use vms::vms_command;

use lc_api::SecretSource;
use lc_core::config::ApiConfig;

/// Login settings shared by `check` and `vms`
#[derive(Debug, Clone, Default)]
pub struct LoginArgs {
    /// Overrides `api.username`
    pub username: Option<String>,
    /// Single explicit secret; disables the candidate scan
    pub password: Option<String>,
}

impl LoginArgs {
    fn username(&self, api: &ApiConfig) -> String {
        self.username.clone().unwrap_or_else(|| api.username.clone())
    }

    fn secrets(&self, api: &ApiConfig) -> SecretSource {
        match &self.password {
            Some(password) => SecretSource::Explicit(password.clone()),
            None => SecretSource::Candidates(api.candidate_passwords.clone()),
        }
    }
}
