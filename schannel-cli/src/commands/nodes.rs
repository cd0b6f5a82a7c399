//! Nodes command - list proxy nodes and export them for the proxy client.

use anyhow::{Context, Result};
use clap::Args;
use schannel_core::{ProxyNode, UsageInfo};
use schannel_store::{UserConfig, save_json};
use std::path::Path;
use tracing::info;

use super::usage::select_services;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the nodes command.
#[derive(Args)]
pub struct NodesArgs {
    /// Service whose nodes to list; all services when omitted.
    pub service: Option<String>,

    /// Only nodes whose region contains this text.
    #[arg(long, short)]
    pub region: Option<String>,

    /// Write the listed nodes to the configured node config file.
    #[arg(long)]
    pub export: bool,
}

/// Runs the nodes command.
pub async fn run(args: &NodesArgs, cli: &Cli, config: &UserConfig) -> Result<()> {
    let (_, bridge) = super::connect(cli, config).await?;
    let mut infos = select_services(bridge.usage_infos().await, args.service.as_deref())?;
    if let Some(region) = &args.region {
        filter_region(&mut infos, region);
    }

    if args.export {
        let target = config
            .node_config_path
            .as_ref()
            .context("node_config_path is not set, see `schannel config set`")?
            .expand()?;
        let nodes: Vec<&ProxyNode> = infos.iter().flat_map(|i| &i.nodes).collect();
        export_nodes(&target, &nodes).await?;
        if !cli.quiet {
            eprintln!("Wrote {} nodes to {}", nodes.len(), target.display());
        }
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let blocks: Vec<String> = infos.iter().map(|i| formatter.format_nodes(i)).collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_nodes(&infos)?);
        }
    }

    Ok(())
}

/// Drops nodes outside `region` (case-insensitive substring).
pub fn filter_region(infos: &mut [UsageInfo], region: &str) {
    let needle = region.to_lowercase();
    for info in infos {
        info.nodes
            .retain(|n| n.region().to_lowercase().contains(&needle));
    }
}

/// Writes nodes in the proxy client's node config format.
pub async fn export_nodes(path: &Path, nodes: &[&ProxyNode]) -> Result<()> {
    save_json(path, &nodes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), count = nodes.len(), "Node config exported");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
