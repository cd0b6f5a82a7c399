//! Services command - list purchased services.

use anyhow::Result;
use chrono::Local;
use schannel_store::UserConfig;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the services command.
pub async fn run(cli: &Cli, config: &UserConfig) -> Result<()> {
    let (_, bridge) = super::connect(cli, config).await?;
    let services = bridge.service_infos().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_services(&services, Local::now().date_naive()));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&services)?);
        }
    }

    Ok(())
}
