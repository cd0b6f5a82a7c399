//! Config command - manage configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use schannel_store::{CONFIG_KEYS, UserConfig, default_cache_dir, default_config_dir};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Print one setting.
    Get {
        /// Setting name.
        key: String,
    },

    /// Change one setting; an empty value clears a path.
    Set {
        /// Setting name.
        key: String,
        /// New value.
        value: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, config: UserConfig) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(&config, cli),
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Get { key } => {
            println!("{}", config.get(key)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => set_value(config, key, value, cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

fn show_config(config: &UserConfig, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            println!("schannel Configuration");
            println!("{}", "─".repeat(40));
            println!();
            for key in CONFIG_KEYS {
                let value = config.get(key)?;
                let value = if value.is_empty() { "(unset)".to_string() } else { value };
                println!("{key:<20} {value}");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let cache_dir = default_cache_dir();
    let config_path = cli.config_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_path.display());
            println!("Cache dir:   {}", cache_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_path.display().to_string(),
                "cache_dir": cache_dir.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_value(mut config: UserConfig, key: &str, value: &str, cli: &Cli) -> Result<()> {
    config
        .set(key, value)
        .with_context(|| format!("setting {key}"))?;
    config.save_to(&cli.config_path()).await?;

    info!(key, "Setting updated");
    if !cli.quiet {
        println!("{key} = {}", config.get(key)?);
    }

    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Configuration reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
