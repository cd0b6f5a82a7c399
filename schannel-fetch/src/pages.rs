//! Account page sources.

use async_trait::async_trait;
use schannel_core::{Invoice, Service, SessionCookie};
use tracing::instrument;
use url::Url;

use crate::client::PageRequest;
use crate::error::FetchError;
use crate::parser::parse_invoice_download_url;
use crate::session::Session;
use crate::site::SiteUrls;

/// Supplies the raw HTML of the logged-in account pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Site the pages belong to; scraped links resolve against it.
    fn site(&self) -> &SiteUrls;

    /// The service list page.
    async fn service_list(&self) -> Result<String, FetchError>;

    /// The detail page of one service.
    async fn service_detail(&self, service: &Service) -> Result<String, FetchError>;

    /// The invoice list page.
    async fn invoice_list(&self) -> Result<String, FetchError>;
}

/// [`PageSource`] backed by the live site.
///
/// Uses one [`Session`] and sends the login cookies with every request.
#[derive(Debug, Clone)]
pub struct SitePages {
    session: Session,
    site: SiteUrls,
    cookies: Vec<SessionCookie>,
}

impl SitePages {
    /// Creates a page source for a logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidProxy` for a bad proxy URL.
    pub fn new(
        site: SiteUrls,
        proxy_url: &str,
        cookies: Vec<SessionCookie>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            session: Session::new(proxy_url)?,
            site,
            cookies,
        })
    }

    /// Fetches an invoice page and returns its PDF download link.
    #[instrument(skip(self, invoice), fields(invoice = %invoice.number))]
    pub async fn invoice_download_url(&self, invoice: &Invoice) -> Result<Option<Url>, FetchError> {
        let url = parse_link(&invoice.link)?;
        let html = self.get(&url, &self.site.invoices()).await?;
        Ok(parse_invoice_download_url(&html, &self.site))
    }

    async fn get(&self, url: &Url, referer: &Url) -> Result<String, FetchError> {
        let page = self
            .session
            .fetch_page(
                PageRequest::get(url)
                    .cookies(&self.cookies)
                    .referer(referer)
                    .gzip(),
            )
            .await?;
        Ok(page.text())
    }
}

fn parse_link(link: &str) -> Result<Url, FetchError> {
    Url::parse(link).map_err(|e| FetchError::InvalidUrl(format!("{link}: {e}")))
}

#[async_trait]
impl PageSource for SitePages {
    fn site(&self) -> &SiteUrls {
        &self.site
    }

    async fn service_list(&self) -> Result<String, FetchError> {
        self.get(&self.site.services(), &self.site.account()).await
    }

    async fn service_detail(&self, service: &Service) -> Result<String, FetchError> {
        let url = parse_link(&service.link)?;
        self.get(&url, &self.site.services()).await
    }

    async fn invoice_list(&self) -> Result<String, FetchError> {
        self.get(&self.site.invoices(), &self.site.account()).await
    }
}
