//! Usage command - fetch and display data usage per service.

use anyhow::{Result, bail};
use chrono::Local;
use clap::Args;
use schannel_core::{UsageInfo, UsageRecorder};
use schannel_store::{HistoryStore, UserConfig};
use tracing::{info, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the usage command.
#[derive(Args, Default)]
pub struct UsageArgs {
    /// Service to show; all services when omitted.
    pub service: Option<String>,

    /// Save today's usage to the local history.
    #[arg(long)]
    pub record: bool,
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli, config: &UserConfig) -> Result<()> {
    let (user, bridge) = super::connect(cli, config).await?;
    let infos = select_services(bridge.usage_infos().await, args.service.as_deref())?;

    if args.record {
        let history = HistoryStore::open_default().await?;
        let recorded = record_usage(&history, &user, &infos).await?;
        info!(user = %user, recorded, "Usage recorded");
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let blocks: Vec<String> = infos.iter().map(|i| formatter.format_usage(i)).collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_usage(&infos)?);
        }
    }

    Ok(())
}

/// Keeps the service named `name`, or all of them.
pub fn select_services(infos: Vec<UsageInfo>, name: Option<&str>) -> Result<Vec<UsageInfo>> {
    let Some(name) = name else {
        return Ok(infos);
    };
    let selected: Vec<UsageInfo> = infos
        .into_iter()
        .filter(|i| i.service.name.eq_ignore_ascii_case(name))
        .collect();
    if selected.is_empty() {
        bail!("no service named {name:?}");
    }
    Ok(selected)
}

/// Saves today's amounts of every parsable service; returns how many.
pub async fn record_usage(
    recorder: &impl UsageRecorder,
    user: &str,
    infos: &[UsageInfo],
) -> Result<usize> {
    let today = Local::now().date_naive();
    let mut recorded = 0;
    for info in infos {
        match info.amounts() {
            Ok(amounts) => {
                recorder
                    .save_usage_snapshot(user, &info.service, amounts, today)
                    .await?;
                recorded += 1;
            }
            Err(e) => warn!(service = %info.service.name, error = %e, "Skipping unparsable usage"),
        }
    }
    Ok(recorded)
}

// ============================================================================
// Tests
// ============================================================================
