//! limen-console CLI
//!
//! Verifies that a VM console session can be opened end to end:
//! - Authenticate against the management API
//! - Pick a VM and negotiate a console session
//! - Probe the console WebSocket and report what happened
//!
//! Exits 0 when the console is stable, 1 when any stage fails and 2 for
//! usage or configuration errors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lc_core::config::CheckConfig;
use limen_console::commands::{self, LoginArgs};
use limen_console::output::print_error;

#[derive(Parser)]
#[command(name = "limen-console")]
#[command(author, version, about = "Verify that a VM console session can be opened end to end")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Management API base URL (overrides config)
    #[arg(long, global = true, env = "LIMEN_BASE_URL")]
    base_url: Option<String>,

    /// Login identity (overrides config)
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Login password; when absent the configured candidates are tried in order
    #[arg(
        short,
        long,
        global = true,
        env = "LIMEN_PASSWORD",
        hide_env_values = true
    )]
    password: Option<String>,

    /// Print the final report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full console check (default)
    Check {
        /// VM handle to target instead of the first listed one
        #[arg(long)]
        vm: Option<String>,
    },

    /// Probe a console WebSocket URL directly
    Probe {
        /// Endpoint URL (ws:// or wss://)
        url: String,
    },

    /// List the VMs visible to the login identity
    Vms,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show config file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity; stderr keeps stdout clean for --json
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{:#}", e));
            2
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let command = cli.command.unwrap_or(Commands::Check { vm: None });
    let config_path = cli.config.as_deref();

    // Commands that work without a loadable configuration
    match &command {
        Commands::Config {
            action: ConfigAction::Path,
        } => {
            commands::config_path(config_path);
            return Ok(0);
        }
        Commands::Config {
            action: ConfigAction::Init { force },
        } => return commands::config_init(config_path, *force),
        _ => {}
    }

    let mut config = CheckConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    config.validate().context("Invalid configuration")?;

    let login = LoginArgs {
        username: cli.username,
        password: cli.password,
    };

    match command {
        Commands::Check { vm } => commands::check_command(&config, &login, vm, cli.json).await,
        Commands::Probe { url } => commands::probe_command(&config.probe, &url, cli.json).await,
        Commands::Vms => commands::vms_command(&config.api, &login, cli.json).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            commands::config_show(config_path, &config)?;
            Ok(0)
        }
        Commands::Config { .. } => Ok(0),
    }
}
