//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

use chrono::NaiveDate;
use schannel_core::{DailyUsage, Invoice, PaymentState, ProxyNode, Service, UsageAmounts, UsageInfo};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service() -> Service {
    Service {
        name: "Basic".to_string(),
        link: "https://www.schannel.net/clientarea.php?action=productdetails&id=1".to_string(),
        price: "¥15.00 CNY".to_string(),
        expires: Some(date(2030, 1, 1)),
        state: "Active".to_string(),
    }
}

fn usage(used: &str) -> UsageInfo {
    UsageInfo {
        port: 10086,
        password: "s3cret".to_string(),
        total: "50GB".to_string(),
        used: used.to_string(),
        upload: "14.66MB".to_string(),
        download: "16.12GB".to_string(),
        nodes: vec![ProxyNode {
            name: "US_LA_1".to_string(),
            kind: "SSR".to_string(),
            server: "us1.example.net".to_string(),
            server_port: 10086,
            password: "s3cret".to_string(),
            method: "aes-256-cfb".to_string(),
            protocol: "origin".to_string(),
            obfs: "plain".to_string(),
        }],
        ..UsageInfo::new(service())
    }
}

fn invoice(state: PaymentState) -> Invoice {
    Invoice {
        number: "4242".to_string(),
        link: "https://www.schannel.net/viewinvoice.php?id=4242".to_string(),
        start_date: Some(date(2029, 12, 1)),
        expire_date: Some(date(2030, 1, 1)),
        payment: 15,
        state,
    }
}

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use super::*;
    use url::Url;

    #[test]
    fn test_progress_bar_boundary_values() {
        let formatter = TextFormatter::new(false);

        let test_cases = vec![
            (0.0, "░░░░░░░░░░"),
            (10.0, "█░░░░░░░░░"),
            (25.0, "███░░░░░░░"), // 2.5 rounds to 3 blocks
            (50.0, "█████░░░░░"),
            (100.0, "██████████"),
        ];

        for (percent, expected) in test_cases {
            assert_eq!(formatter.progress_bar(percent), expected, "Failed for {percent}%");
        }
    }

    #[test]
    fn test_services_table() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_services(&[service()], date(2029, 6, 1));

        assert!(output.contains("Service"));
        assert!(output.contains("Basic"));
        assert!(output.contains("2030-01-01"));
        assert!(output.contains("Active"));
    }

    #[test]
    fn test_expired_service_is_red() {
        let formatter = TextFormatter::new(true);
        let output = formatter.format_services(&[service()], date(2030, 1, 2));
        assert!(output.contains("\x1b[31m2030-01-01"));
    }

    #[test]
    fn test_no_services() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_services(&[], date(2030, 1, 1)), "No services");
    }

    #[test]
    fn test_usage_shows_quota() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&usage("16.14GB"));

        assert!(output.starts_with("Basic (Active)"));
        assert!(output.contains("16.14GB of 50GB used"));
        assert!(output.contains("68% left"));
        assert!(output.contains("Port:     10086"));
        assert!(!output.contains("s3cret"));
        assert!(!output.contains("almost used up"));
    }

    #[test]
    fn test_usage_near_limit_warning() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&usage("46GB"));
        assert!(output.contains("Quota almost used up"));
    }

    #[test]
    fn test_usage_with_unparsable_amounts() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_usage(&usage("n/a"));
        assert!(output.contains("n/a of 50GB used"));
        assert!(!output.contains("left"));
    }

    #[test]
    fn test_nodes_include_region() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_nodes(&usage("1GB"));

        assert!(output.contains("Name:US_LA_1"));
        assert!(output.contains("United States-Los Angeles"));
    }

    #[test]
    fn test_invoice_status_labels() {
        let formatter = TextFormatter::new(false);
        let invoices = [invoice(PaymentState::Paid), invoice(PaymentState::Unpaid)];

        let output = formatter.format_invoices(&invoices, date(2029, 12, 15), None);
        assert!(output.contains("no payment needed"));
        assert!(output.contains("payment needed"));

        let overdue = formatter.format_invoices(&invoices[1..], date(2030, 1, 2), None);
        assert!(overdue.contains("payment needed, invoice overdue"));
    }

    #[test]
    fn test_invoice_links() {
        let formatter = TextFormatter::new(false);
        let url = Url::parse("https://www.schannel.net/dl.php?type=i&id=4242").unwrap();
        let invoices = [invoice(PaymentState::Paid), invoice(PaymentState::Unpaid)];
        let links = [Some(url), None];

        let output = formatter.format_invoices(&invoices, date(2029, 12, 15), Some(&links[..]));
        assert!(output.contains("dl.php?type=i&id=4242"));
        assert!(output.contains("no download"));
    }

    #[test]
    fn test_history_rows() {
        let formatter = TextFormatter::new(false);
        let amounts = UsageAmounts {
            total_kb: 50 * 1024 * 1024,
            used_kb: 2048,
            upload_kb: 1024,
            download_kb: 1024,
        };
        let records = [DailyUsage::new("alice", "Basic", date(2030, 1, 1), &amounts)];

        let output = formatter.format_history("Basic", &records);
        assert!(output.contains("Basic daily usage"));
        assert!(output.contains("2030-01-01"));
        assert!(output.contains("2.00MB"));

        let empty = formatter.format_history("Basic", &[]);
        assert_eq!(empty, "No recorded usage for Basic");
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use super::*;

    #[test]
    fn test_usage_json_fields() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_usage(&[usage("25GB")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let entry = &value[0];
        assert_eq!(entry["service"]["name"], "Basic");
        assert_eq!(entry["port"], 10086);
        assert_eq!(entry["usedPercent"], 50.0);
        assert_eq!(entry["remainingKb"], 25 * 1024 * 1024);
        assert_eq!(entry["nearLimit"], false);
        assert_eq!(entry["nodes"], 1);
        assert!(entry.get("password").is_none());
    }

    #[test]
    fn test_usage_json_skips_unparsable_amounts() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_usage(&[usage("?")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(value[0].get("usedPercent").is_none());
        assert_eq!(value[0]["used"], "?");
    }

    #[test]
    fn test_nodes_json() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_nodes(&[usage("1GB")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let node = &value[0]["nodes"][0];
        assert_eq!(value[0]["service"], "Basic");
        assert_eq!(node["name"], "US_LA_1");
        assert_eq!(node["serverPort"], 10086);
        assert_eq!(node["region"], "United States-Los Angeles");
    }

    #[test]
    fn test_invoices_json() {
        let formatter = JsonFormatter::new(false);
        let output = formatter
            .format_invoices(&[invoice(PaymentState::Unpaid)], date(2030, 1, 2), None)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value[0]["number"], "4242");
        assert_eq!(value[0]["status"], "payment needed, invoice overdue");
        assert_eq!(value[0]["paid"], false);
        assert!(value[0].get("downloadUrl").is_none());
    }

    #[test]
    fn test_history_json() {
        let formatter = JsonFormatter::new(true);
        let amounts = UsageAmounts {
            total_kb: 100,
            used_kb: 30,
            upload_kb: 10,
            download_kb: 20,
        };
        let records = [DailyUsage::new("alice", "Basic", date(2030, 1, 1), &amounts)];

        let output = formatter.format_history("Basic", &records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["service"], "Basic");
        assert_eq!(value["days"][0]["date"], "2030-01-01");
        assert_eq!(value["days"][0]["usedKb"], 30);
    }
}
