//! Account page parsers.
//!
//! Every selector and pattern that knows the site's markup lives here.

use chrono::NaiveDate;
use regex::Regex;
use schannel_core::{Invoice, PaymentState, ProxyNode, Service, UsageInfo};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::site::SiteUrls;

// ============================================================================
// Selectors and Patterns
// ============================================================================

static SERVICE_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#tableServicesList tbody tr").expect("Invalid selector"));

static INVOICE_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#tableInvoicesList tbody tr").expect("Invalid selector"));

static PANELS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("section.panel").expect("Invalid selector"));

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid selector"));

static BODY_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("Invalid selector"));

static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("Invalid selector"));

static HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("header").expect("Invalid selector"));

static USAGE_LINES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#plugin-usage p").expect("Invalid selector"));

static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("Invalid selector"));

static SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("Invalid selector"));

static TOKEN_INPUT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input[type='hidden'][name='token']").expect("Invalid selector")
});

static DOWNLOAD_ICON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("i.fa-download").expect("Invalid selector"));

/// "已使用 (16.14GB)" style usage line.
static DATA_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+ \((.+(?:GB|MB|KB))\)").expect("Invalid regex"));

/// "使用报表 (流量：50GB)" style quota header.
static TOTAL_QUOTA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+ \(流量：(.+(?:GB|MB|KB))\)").expect("Invalid regex"));

const DATE_FORMAT: &str = "%Y-%m-%d";
const PAID_LABEL: &str = "已付款";

/// Number of `section.panel` blocks a service page must have.
const SERVICE_PANELS: usize = 4;

// ============================================================================
// Helpers
// ============================================================================

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.select(&CELL).collect()
}

fn link_in(cell: Option<&ElementRef<'_>>) -> String {
    cell.and_then(|c| c.select(&LINK).next())
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string()
}

fn date_in(cell: Option<&ElementRef<'_>>) -> Option<NaiveDate> {
    let text = cell.and_then(|c| c.select(&SPAN).next()).map(text_of)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).ok()
}

fn absolute(site: &SiteUrls, link: &str) -> String {
    site.resolve(link)
        .map(String::from)
        .unwrap_or_else(|_| link.to_string())
}

fn capture(re: &Regex, text: &str, what: &str) -> Result<String, FetchError> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FetchError::Parse(format!("{what} not found in {text:?}")))
}

// ============================================================================
// Services
// ============================================================================

/// Parses the service list page.
///
/// Columns: name, detail link with price, expiry date, state. Rows whose
/// expiry is missing or malformed get `expires: None`.
pub fn parse_services(html: &str, site: &SiteUrls) -> Vec<Service> {
    let document = Html::parse_document(html);

    let services: Vec<Service> = document
        .select(&SERVICE_ROWS)
        .map(|row| {
            let tds = cells(row);
            Service {
                name: tds.first().copied().map(text_of).unwrap_or_default(),
                link: absolute(site, &link_in(tds.get(1))),
                price: tds.get(1).copied().map(text_of).unwrap_or_default(),
                expires: date_in(tds.get(2)),
                state: tds.get(3).copied().map(text_of).unwrap_or_default(),
            }
        })
        .collect();

    debug!(count = services.len(), "Parsed services");
    services
}

// ============================================================================
// Usage
// ============================================================================

/// Parses a service detail page.
///
/// The page has four `section.panel` blocks. The second holds port and
/// password, the third the quota header and the `#plugin-usage` lines
/// (used, upload, download), the fourth the node table.
///
/// # Errors
///
/// Returns `FetchError::Parse` if a panel, the quota or a usage line is
/// missing.
pub fn parse_usage_info(html: &str, service: &Service) -> Result<UsageInfo, FetchError> {
    let document = Html::parse_document(html);
    let panels: Vec<ElementRef<'_>> = document.select(&PANELS).collect();
    if panels.len() < SERVICE_PANELS {
        return Err(FetchError::Parse(format!(
            "service page for {:?} has {} panels, expected {SERVICE_PANELS}",
            service.name,
            panels.len()
        )));
    }

    let mut info = UsageInfo::new(service.clone());

    let endpoint: Vec<String> = panels[1]
        .select(&TABLE)
        .next()
        .map(|table| {
            table
                .select(&BODY_ROWS)
                .flat_map(|row| row.select(&CELL))
                .map(text_of)
                .collect()
        })
        .unwrap_or_default();
    info.port = endpoint.first().and_then(|p| p.parse().ok()).unwrap_or(0);
    info.password = endpoint.get(1).cloned().unwrap_or_default();

    let header = panels[2].select(&HEADER).next().map(text_of).unwrap_or_default();
    info.total = capture(&TOTAL_QUOTA_RE, &header, "total quota")?;

    let lines: Vec<String> = panels[2].select(&USAGE_LINES).map(text_of).collect();
    let line = |index: usize, what: &str| {
        lines
            .get(index)
            .ok_or_else(|| FetchError::Parse(format!("{what} line missing")))
            .and_then(|text| capture(&DATA_AMOUNT_RE, text, what))
    };
    info.used = line(0, "used amount")?;
    info.upload = line(1, "upload amount")?;
    info.download = line(2, "download amount")?;

    if let Some(table) = panels[3].select(&TABLE).next() {
        info.nodes = table
            .select(&BODY_ROWS)
            .filter_map(|row| parse_node(row, &info))
            .collect();
    }

    debug!(service = %service.name, nodes = info.nodes.len(), "Parsed usage");
    Ok(info)
}

/// Node table columns: name, type, address, cipher, protocol, obfuscation.
/// Port and password are shared by every node of the service.
fn parse_node(row: ElementRef<'_>, info: &UsageInfo) -> Option<ProxyNode> {
    let tds: Vec<String> = row.children().filter_map(ElementRef::wrap).map(text_of).collect();
    let [name, kind, server, method, protocol, obfs, ..] = tds.as_slice() else {
        return None;
    };

    Some(ProxyNode {
        name: name.clone(),
        kind: kind.clone(),
        server: server.clone(),
        server_port: info.port,
        password: info.password.clone(),
        method: method.clone(),
        protocol: protocol.clone(),
        obfs: obfs.clone(),
    })
}

// ============================================================================
// Invoices
// ============================================================================

/// Parses the invoice list page.
///
/// The amount comes from the fourth cell's `data-order` attribute and
/// defaults to 0. Unknown state labels count as unpaid.
pub fn parse_invoices(html: &str, site: &SiteUrls) -> Vec<Invoice> {
    let document = Html::parse_document(html);

    let invoices: Vec<Invoice> = document
        .select(&INVOICE_ROWS)
        .map(|row| {
            let tds = cells(row);
            let state = match tds.get(4).copied().map(text_of).as_deref() {
                Some(PAID_LABEL) => PaymentState::Paid,
                _ => PaymentState::Unpaid,
            };
            Invoice {
                number: tds.first().copied().map(text_of).unwrap_or_default(),
                link: absolute(site, &link_in(tds.get(5))),
                start_date: date_in(tds.get(1)),
                expire_date: date_in(tds.get(2)),
                payment: tds
                    .get(3)
                    .and_then(|c| c.value().attr("data-order"))
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0),
                state,
            }
        })
        .collect();

    debug!(count = invoices.len(), "Parsed invoices");
    invoices
}

/// Finds the PDF download link on an invoice page.
pub fn parse_invoice_download_url(html: &str, site: &SiteUrls) -> Option<Url> {
    let document = Html::parse_document(html);
    document
        .select(&LINK)
        .find(|a| a.select(&DOWNLOAD_ICON).next().is_some())
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| site.resolve(href).ok())
}

// ============================================================================
// Login
// ============================================================================

/// Returns the value of the first hidden `token` input, if any.
pub fn parse_login_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TOKEN_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}
