//! Text output formatting with progress bars and colors.

use chrono::NaiveDate;
use schannel_core::{DailyUsage, DataSize, Invoice, InvoiceStatus, ProxyNode, Service, UsageInfo};
use url::Url;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats the service table.
    pub fn format_services(&self, services: &[Service], today: NaiveDate) -> String {
        if services.is_empty() {
            return self.dim("No services");
        }

        let mut lines = vec![format!(
            "{:<20} {:<14} {:<12} {}",
            self.bold("Service"),
            self.bold("Price"),
            self.bold("Due"),
            self.bold("State")
        )];

        for service in services {
            let due = format_date(service.expires);
            let due = if service.is_expired(today) {
                self.red(&due)
            } else {
                due
            };
            lines.push(format!(
                "{:<20} {:<14} {:<12} {}",
                service.name, service.price, due, service.state
            ));
        }

        lines.join("\n")
    }

    /// Formats usage for one service.
    pub fn format_usage(&self, info: &UsageInfo) -> String {
        let mut lines = vec![format!(
            "{} ({})",
            self.bold(&info.service.name),
            info.service.state
        )];

        match info.amounts() {
            Ok(amounts) => {
                let remaining = 100.0 - amounts.used_ratio() * 100.0;
                let bar = self.progress_bar(remaining);
                let pct = self.color_for_percent(remaining, &format!("{remaining:.0}% left"));
                lines.push(format!("{:<9} {bar} {pct}", "Data:"));
                lines.push(format!(
                    "          {} of {} used",
                    info.used, info.total
                ));
                lines.push(format!(
                    "          {} up, {} down",
                    info.upload, info.download
                ));
                if info.is_near_limit() {
                    lines.push(self.red("          Quota almost used up"));
                }
            }
            Err(_) => {
                lines.push(format!(
                    "{:<9} {} of {} used",
                    "Data:", info.used, info.total
                ));
            }
        }

        lines.push(format!("{:<9} {}", "Port:", info.port));
        lines.push(format!("{:<9} {}", "Nodes:", info.nodes.len()));

        lines.join("\n")
    }

    /// Formats the node list of a service.
    pub fn format_nodes(&self, info: &UsageInfo) -> String {
        let mut lines = vec![self.bold(&info.service.name)];
        if info.nodes.is_empty() {
            lines.push(self.dim("  No nodes"));
        }
        for node in &info.nodes {
            lines.push(self.format_node(node));
        }
        lines.join("\n")
    }

    fn format_node(&self, node: &ProxyNode) -> String {
        format!("  {node} {}", self.cyan(&node.region()))
    }

    /// Formats the invoice table, with download links when given.
    pub fn format_invoices(
        &self,
        invoices: &[Invoice],
        today: NaiveDate,
        links: Option<&[Option<Url>]>,
    ) -> String {
        if invoices.is_empty() {
            return self.dim("No invoices");
        }

        let mut lines = vec![format!(
            "{:<10} {:<12} {:<12} {:>8}  {}",
            self.bold("Invoice"),
            self.bold("Issued"),
            self.bold("Due"),
            self.bold("Amount"),
            self.bold("Status")
        )];

        for (i, invoice) in invoices.iter().enumerate() {
            let status = invoice.status(today);
            lines.push(format!(
                "{:<10} {:<12} {:<12} {:>8}  {}",
                invoice.number,
                format_date(invoice.start_date),
                format_date(invoice.expire_date),
                invoice.payment,
                self.color_for_status(status)
            ));
            if let Some(links) = links {
                match links.get(i).and_then(Option::as_ref) {
                    Some(url) => lines.push(format!("           {}", self.dim(url.as_str()))),
                    None => lines.push(format!("           {}", self.dim("no download"))),
                }
            }
        }

        lines.join("\n")
    }

    /// Formats recorded days, newest first.
    pub fn format_history(&self, service: &str, records: &[DailyUsage]) -> String {
        if records.is_empty() {
            return self.dim(&format!("No recorded usage for {service}"));
        }

        let mut lines = vec![
            self.bold(&format!("{service} daily usage")),
            "─".repeat(40),
        ];
        for record in records {
            lines.push(format!(
                "{}  {:>10} used  {:>10} up  {:>10} down",
                record.date.format("%Y-%m-%d"),
                format_kb(record.used_kb()),
                format_kb(record.upload_kb),
                format_kb(record.download_kb)
            ));
        }

        lines.join("\n")
    }

    /// Formats a progress bar.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let percent = percent_remaining.clamp(0.0, 100.0);
        let filled = ((percent / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 10.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn color_for_status(&self, status: InvoiceStatus) -> String {
        let label = status.to_string();
        match status {
            InvoiceStatus::Paid => self.green(&label),
            InvoiceStatus::PaidExpired => self.dim(&label),
            InvoiceStatus::Unpaid => self.yellow(&label),
            InvoiceStatus::UnpaidOverdue => self.red(&label),
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn format_kb(kb: u64) -> String {
    DataSize::from_kilobytes(kb).to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_full() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(100.0), "██████████");
    }

    #[test]
    fn test_progress_bar_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(0.0), "░░░░░░░░░░");
    }

    #[test]
    fn test_progress_bar_clamps_overuse() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(-20.0), "░░░░░░░░░░");
    }

    #[test]
    fn test_color_for_percent() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.color_for_percent(5.0, "test").contains(RED));
        assert!(formatter.color_for_percent(35.0, "test").contains(YELLOW));
        assert!(formatter.color_for_percent(75.0, "test").contains(GREEN));
    }

    #[test]
    fn test_format_kb() {
        assert_eq!(format_kb(512), "512.00KB");
        assert_eq!(format_kb(1536), "1.50MB");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(None), "-");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2030, 1, 2)), "2030-01-02");
    }
}
