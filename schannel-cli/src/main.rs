// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! schannel CLI - account, usage and node lists from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in and keep the password in the system keychain
//! schannel login alice --remember
//!
//! # Usage of every service (default command)
//! schannel
//!
//! # Record today's usage for the history view
//! schannel usage --record
//!
//! # Write the node list of one service for the proxy client
//! schannel nodes Basic --export
//!
//! # JSON output
//! schannel invoices --format json --pretty
//!
//! # Route site traffic through a proxy
//! schannel config set proxy_url socks5://127.0.0.1:1080
//! ```

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use schannel_fetch::{FetchError, LoginError};
use schannel_store::{ConfigPath, StoreError, UserConfig, default_config_path};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{account, config, history, invoices, nodes, services, usage};

// ============================================================================
// CLI Definition
// ============================================================================

/// schannel CLI - account client for schannel.net.
#[derive(Parser)]
#[command(name = "schannel")]
#[command(about = "Account, usage and proxy node client for schannel.net")]
#[command(long_about = r#"
schannel logs in to the schannel.net client area and shows services,
data usage, proxy nodes and invoices. Account pages are cached for
20 minutes per run.

Examples:
  schannel login alice --remember   # Log in, keep password in keychain
  schannel                          # Usage of every service
  schannel nodes Basic --export     # Write node list for the proxy client
  schannel history Basic            # Last 5 recorded days
  schannel config show              # Current settings
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Account to use; defaults to the most recently logged in.
    #[arg(long, short, global = true, env = "SCHANNEL_USER")]
    pub user: Option<String>,

    /// Config file to use instead of the default.
    #[arg(long, global = true, env = "SCHANNEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Path of the config file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and save the session.
    Login(account::LoginArgs),

    /// Drop the saved session.
    Logout(account::LogoutArgs),

    /// List purchased services.
    #[command(visible_alias = "s")]
    Services,

    /// Show data usage (default if no command specified).
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// List proxy nodes.
    #[command(visible_alias = "n")]
    Nodes(nodes::NodesArgs),

    /// List invoices.
    #[command(visible_alias = "i")]
    Invoices(invoices::InvoicesArgs),

    /// Show recorded daily usage.
    History(history::HistoryArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No saved session for the account.
    NotLoggedIn = 2,
    /// The site refused the login.
    LoginFailed = 3,
    /// Network or HTTP status error.
    Network = 4,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(e) = cause.downcast_ref::<StoreError>() {
                match e {
                    StoreError::NotLoggedIn(_) => return Self::NotLoggedIn,
                    StoreError::Fetch(_) => return Self::Network,
                    _ => {}
                }
            }
            if let Some(e) = cause.downcast_ref::<LoginError>() {
                return match e {
                    LoginError::Fetch(_) => Self::Network,
                    _ => Self::LoginFailed,
                };
            }
            if cause.downcast_ref::<FetchError>().is_some() {
                return Self::Network;
            }
        }
        Self::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, log_file: Option<&ConfigPath>) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("schannel=debug,info")
    } else {
        EnvFilter::new("schannel=warn")
    };

    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!("Warning: not logging to {path}: {e:#}");
            None
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .with(filter)
        .init();
}

fn open_log_file(path: &ConfigPath) -> Result<std::fs::File> {
    let path = path.expand()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = UserConfig::load_from(&cli.config_path()).await;
    setup_logging(
        cli.verbose,
        cli.quiet,
        config.as_ref().ok().and_then(|c| c.log_file.as_ref()),
    );

    let result = match config {
        Ok(config) => run(&cli, config).await,
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("loading {}", cli.config_path().display()))),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

async fn run(cli: &Cli, config: UserConfig) -> Result<()> {
    match &cli.command {
        Some(Commands::Login(args)) => account::login(args, cli, &config).await,
        Some(Commands::Logout(args)) => account::logout(args, cli).await,
        Some(Commands::Services) => services::run(cli, &config).await,
        Some(Commands::Usage(args)) => usage::run(args, cli, &config).await,
        Some(Commands::Nodes(args)) => nodes::run(args, cli, &config).await,
        Some(Commands::Invoices(args)) => invoices::run(args, cli, &config).await,
        Some(Commands::History(args)) => history::run(args, cli).await,
        Some(Commands::Config(args)) => config::run(args, cli, config).await,
        None => {
            // Default to usage command
            usage::run(&usage::UsageArgs::default(), cli, &config).await
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
