//! JSON output formatting.

use anyhow::Result;
use chrono::NaiveDate;
use schannel_core::{DailyUsage, Invoice, ProxyNode, Service, UsageInfo};
use serde::Serialize;
use url::Url;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one service's usage.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageOutput<'a> {
    pub service: &'a Service,
    pub port: u16,
    pub total: &'a str,
    pub used: &'a str,
    pub upload: &'a str,
    pub download: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_kb: Option<u64>,
    pub near_limit: bool,
    pub nodes: usize,
}

/// JSON output for a service's nodes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesOutput<'a> {
    pub service: &'a str,
    pub nodes: Vec<NodeOutput<'a>>,
}

/// A single node with its region.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub region: String,
    pub server: &'a str,
    pub server_port: u16,
    pub method: &'a str,
    pub protocol: &'a str,
    pub obfs: &'a str,
}

/// JSON output for an invoice.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOutput<'a> {
    #[serde(flatten)]
    pub invoice: &'a Invoice,
    pub status: String,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<&'a str>,
}

/// JSON output for a history query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOutput<'a> {
    pub service: &'a str,
    pub days: Vec<DayOutput>,
}

/// One recorded day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOutput {
    pub date: String,
    pub used_kb: u64,
    pub upload_kb: u64,
    pub download_kb: u64,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats usage of several services.
    pub fn format_usage(&self, infos: &[UsageInfo]) -> Result<String> {
        let outputs: Vec<UsageOutput<'_>> = infos.iter().map(usage_to_output).collect();
        self.format(&outputs)
    }

    /// Formats the node lists of several services.
    pub fn format_nodes(&self, infos: &[UsageInfo]) -> Result<String> {
        let outputs: Vec<NodesOutput<'_>> = infos
            .iter()
            .map(|info| NodesOutput {
                service: &info.service.name,
                nodes: info.nodes.iter().map(node_to_output).collect(),
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats invoices with their status on `today`.
    pub fn format_invoices(
        &self,
        invoices: &[Invoice],
        today: NaiveDate,
        links: Option<&[Option<Url>]>,
    ) -> Result<String> {
        let outputs: Vec<InvoiceOutput<'_>> = invoices
            .iter()
            .enumerate()
            .map(|(i, invoice)| {
                let status = invoice.status(today);
                InvoiceOutput {
                    invoice,
                    status: status.to_string(),
                    paid: status.is_paid(),
                    download_url: links
                        .and_then(|l| l.get(i))
                        .and_then(Option::as_ref)
                        .map(Url::as_str),
                }
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats recorded days of a service.
    pub fn format_history(&self, service: &str, records: &[DailyUsage]) -> Result<String> {
        let output = HistoryOutput {
            service,
            days: records
                .iter()
                .map(|r| DayOutput {
                    date: r.date.format("%Y-%m-%d").to_string(),
                    used_kb: r.used_kb(),
                    upload_kb: r.upload_kb,
                    download_kb: r.download_kb,
                })
                .collect(),
        };
        self.format(&output)
    }
}

fn usage_to_output(info: &UsageInfo) -> UsageOutput<'_> {
    let amounts = info.amounts().ok();
    UsageOutput {
        service: &info.service,
        port: info.port,
        total: &info.total,
        used: &info.used,
        upload: &info.upload,
        download: &info.download,
        used_percent: amounts.map(|a| (a.used_ratio() * 1000.0).round() / 10.0),
        remaining_kb: amounts.map(|a| a.remaining_kb()),
        near_limit: info.is_near_limit(),
        nodes: info.nodes.len(),
    }
}

fn node_to_output(node: &ProxyNode) -> NodeOutput<'_> {
    NodeOutput {
        name: &node.name,
        kind: &node.kind,
        region: node.region(),
        server: &node.server,
        server_port: node.server_port,
        method: &node.method,
        protocol: &node.protocol,
        obfs: &node.obfs,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }
}
