//! Parser tests against trimmed copies of the account pages.

use chrono::NaiveDate;
use schannel_core::{PaymentState, Service};

use crate::parser::{
    parse_invoice_download_url, parse_invoices, parse_login_token, parse_services,
    parse_usage_info,
};
use crate::site::SiteUrls;

const SERVICES_PAGE: &str = r#"
<html><body>
<table id="tableServicesList">
  <thead><tr><th>产品/服务</th><th>价格</th><th>下次付款日</th><th>状态</th></tr></thead>
  <tbody>
    <tr>
      <td>SS 标准套餐</td>
      <td><a href="clientarea.php?action=productdetails&amp;id=101">¥15.00 CNY</a></td>
      <td><span class="hidden">2018-07-28</span>2018-07-28</td>
      <td><span class="label">有效</span></td>
    </tr>
    <tr>
      <td>SS 高级套餐</td>
      <td><a href="clientarea.php?action=productdetails&amp;id=102">¥30.00 CNY</a></td>
      <td><span>-</span></td>
      <td>已暂停</td>
    </tr>
  </tbody>
</table>
</body></html>
"#;

const SERVICE_PAGE: &str = r#"
<html><body>
<section class="panel"><header>产品详情</header></section>
<section class="panel">
  <table><thead><tr><th>端口</th><th>密码</th></tr></thead>
  <tbody><tr><td>10086</td><td>s3cret</td></tr></tbody></table>
</section>
<section class="panel">
  <header>使用报表 (流量：50GB)</header>
  <div id="plugin-usage">
    <p>已使用 (16.14GB)</p>
    <p>上传 (14.66MB)</p>
    <p>下载 (16.12GB)</p>
  </div>
</section>
<section class="panel">
  <table>
    <thead><tr><th>节点</th><th>类型</th><th>地址</th><th>加密</th><th>协议</th><th>混淆</th></tr></thead>
    <tbody>
      <tr><td>US-1</td><td>SSR</td><td>us1.example.net</td><td>aes-256-cfb</td><td>auth_sha1_v4</td><td>tls1.2_ticket_auth</td></tr>
      <tr><td>Tokyo-2</td><td>SSR</td><td>jp2.example.net</td><td>chacha20</td><td>origin</td><td>plain</td></tr>
    </tbody>
  </table>
</section>
</body></html>
"#;

const INVOICES_PAGE: &str = r#"
<table id="tableInvoicesList">
  <tbody>
    <tr>
      <td>12345</td>
      <td><span class="hidden">2018-04-10</span></td>
      <td><span class="hidden">2018-04-11</span></td>
      <td data-order="10">¥10.00 CNY</td>
      <td><span class="label">未付款</span></td>
      <td><a href="viewinvoice.php?id=12345">查看</a></td>
    </tr>
    <tr>
      <td>2345</td>
      <td><span>2018-04-30</span></td>
      <td><span>2018-04-30</span></td>
      <td data-order="10">¥10.00 CNY</td>
      <td>已付款</td>
      <td><a href="viewinvoice.php?id=2345">查看</a></td>
    </tr>
    <tr>
      <td>345</td>
      <td><span>2018-05-28</span></td>
      <td><span>2018-05-29</span></td>
      <td>¥10.00 CNY</td>
      <td>已取消</td>
      <td><a href="viewinvoice.php?id=345">查看</a></td>
    </tr>
  </tbody>
</table>
"#;

fn service() -> Service {
    Service {
        name: "SS 标准套餐".to_string(),
        link: "https://www.schannel.net/clientarea.php?action=productdetails&id=101".to_string(),
        price: "¥15.00 CNY".to_string(),
        expires: NaiveDate::from_ymd_opt(2018, 7, 28),
        state: "有效".to_string(),
    }
}

// ============================================================================
// Services
// ============================================================================

#[test]
fn test_parse_services() {
    let services = parse_services(SERVICES_PAGE, &SiteUrls::default());

    assert_eq!(services.len(), 2);
    assert_eq!(services[0], service());
    assert_eq!(services[1].expires, None);
    assert_eq!(services[1].state, "已暂停");
    assert!(services[1].link.ends_with("id=102"));
}

#[test]
fn test_parse_services_without_table() {
    assert!(parse_services("<html></html>", &SiteUrls::default()).is_empty());
}

// ============================================================================
// Usage
// ============================================================================

#[test]
fn test_parse_usage_info() {
    let info = parse_usage_info(SERVICE_PAGE, &service()).unwrap();

    assert_eq!(info.service, service());
    assert_eq!(info.port, 10086);
    assert_eq!(info.password, "s3cret");
    assert_eq!(info.total, "50GB");
    assert_eq!(info.used, "16.14GB");
    assert_eq!(info.upload, "14.66MB");
    assert_eq!(info.download, "16.12GB");

    assert_eq!(info.nodes.len(), 2);
    let node = &info.nodes[0];
    assert_eq!(node.name, "US-1");
    assert_eq!(node.kind, "SSR");
    assert_eq!(node.server, "us1.example.net");
    assert_eq!(node.server_port, 10086);
    assert_eq!(node.password, "s3cret");
    assert_eq!(node.method, "aes-256-cfb");
    assert_eq!(node.protocol, "auth_sha1_v4");
    assert_eq!(node.obfs, "tls1.2_ticket_auth");
}

#[test]
fn test_parse_usage_info_amounts_convert() {
    let info = parse_usage_info(SERVICE_PAGE, &service()).unwrap();
    let amounts = info.amounts().unwrap();
    assert_eq!(amounts.total_kb, 50 * 1024 * 1024);
    assert!(amounts.used_kb > amounts.upload_kb);
}

#[test]
fn test_parse_usage_info_missing_panels() {
    let err = parse_usage_info("<section class=\"panel\"></section>", &service()).unwrap_err();
    assert!(err.to_string().contains("panels"));
}

#[test]
fn test_parse_usage_info_missing_quota() {
    let page = SERVICE_PAGE.replace("(流量：50GB)", "");
    assert!(parse_usage_info(&page, &service()).is_err());
}

#[test]
fn test_parse_usage_info_missing_usage_line() {
    let page = SERVICE_PAGE.replace("<p>下载 (16.12GB)</p>", "");
    let err = parse_usage_info(&page, &service()).unwrap_err();
    assert!(err.to_string().contains("download"));
}

// ============================================================================
// Invoices
// ============================================================================

#[test]
fn test_parse_invoices() {
    let invoices = parse_invoices(INVOICES_PAGE, &SiteUrls::default());

    assert_eq!(invoices.len(), 3);

    let first = &invoices[0];
    assert_eq!(first.number, "12345");
    assert_eq!(first.link, "https://www.schannel.net/viewinvoice.php?id=12345");
    assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2018, 4, 10));
    assert_eq!(first.expire_date, NaiveDate::from_ymd_opt(2018, 4, 11));
    assert_eq!(first.payment, 10);
    assert_eq!(first.state, PaymentState::Unpaid);

    assert_eq!(invoices[1].state, PaymentState::Paid);

    // No data-order, unknown label
    assert_eq!(invoices[2].payment, 0);
    assert_eq!(invoices[2].state, PaymentState::Unpaid);
}

#[test]
fn test_parse_invoice_download_url() {
    let page = r#"<div class="btn-group">
        <a href="dl.php?type=i&amp;id=12345" class="btn"><i class="fas fa-download"></i> 下载</a>
        <a href="javascript:window.print()" class="btn"><i class="fas fa-print"></i></a>
    </div>"#;

    let url = parse_invoice_download_url(page, &SiteUrls::default()).unwrap();
    assert_eq!(url.as_str(), "https://www.schannel.net/dl.php?type=i&id=12345");

    assert!(parse_invoice_download_url("<a href=\"x\">x</a>", &SiteUrls::default()).is_none());
}

// ============================================================================
// Login token
// ============================================================================

#[test]
fn test_parse_login_token() {
    let page = r#"<form method="post" action="dologin.php">
        <input type="hidden" name="token" value="XYZ">
        <input type="text" name="username">
    </form>"#;
    assert_eq!(parse_login_token(page).as_deref(), Some("XYZ"));
}

#[test]
fn test_parse_login_token_first_wins() {
    let page = r#"<input type="hidden" name="token" value="first">
        <input type="hidden" name="token" value="second">"#;
    assert_eq!(parse_login_token(page).as_deref(), Some("first"));
}

#[test]
fn test_parse_login_token_ignores_visible_inputs() {
    let page = r#"<input type="text" name="token" value="visible">"#;
    assert_eq!(parse_login_token(page), None);
}
