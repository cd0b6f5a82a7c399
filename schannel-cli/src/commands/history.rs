//! History command - the last five recorded days of a service.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use schannel_store::HistoryStore;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Service name as listed by `schannel services`.
    pub service: String,

    /// Last day to show (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Runs the history command.
pub async fn run(args: &HistoryArgs, cli: &Cli) -> Result<()> {
    let user = super::resolve_user(cli).await?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    let history = HistoryStore::open_default().await?;
    let records = history.recent(&user, &args.service, date).await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_history(&args.service, &records));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_history(&args.service, &records)?);
        }
    }

    Ok(())
}
