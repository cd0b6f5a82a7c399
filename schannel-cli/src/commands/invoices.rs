//! Invoices command - list invoices and their download links.

use anyhow::Result;
use chrono::Local;
use clap::Args;
use schannel_store::UserConfig;
use tracing::warn;
use url::Url;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the invoices command.
#[derive(Args)]
pub struct InvoicesArgs {
    /// Only invoices that still need payment.
    #[arg(long)]
    pub unpaid: bool,

    /// Look up the PDF download link of each invoice.
    #[arg(long)]
    pub links: bool,
}

/// Runs the invoices command.
pub async fn run(args: &InvoicesArgs, cli: &Cli, config: &UserConfig) -> Result<()> {
    let (_, bridge) = super::connect(cli, config).await?;
    let today = Local::now().date_naive();

    let mut invoices = bridge.invoices().await;
    if args.unpaid {
        invoices.retain(|i| !i.status(today).is_paid());
    }

    let links = if args.links {
        let mut links: Vec<Option<Url>> = Vec::with_capacity(invoices.len());
        for invoice in &invoices {
            match bridge.source().invoice_download_url(invoice).await {
                Ok(url) => links.push(url),
                Err(e) => {
                    warn!(invoice = %invoice.number, error = %e, "Download link lookup failed");
                    links.push(None);
                }
            }
        }
        Some(links)
    } else {
        None
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_invoices(&invoices, today, links.as_deref()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_invoices(&invoices, today, links.as_deref())?);
        }
    }

    Ok(())
}
