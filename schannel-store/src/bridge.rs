//! Cached account data.
//!
//! [`DataBridge`] serves services, usage and invoices from an in-memory
//! snapshot of the logged-in account pages. The snapshot is filled on the
//! first read and refetched on any read once it is [`CACHE_TTL`] old.
//!
//! Every read holds the bridge lock for its whole duration, including a
//! refresh, so concurrent readers of a stale cache wait for one refresh
//! instead of starting their own.

use chrono::{DateTime, Utc};
use schannel_core::{Invoice, Service, SessionCookie, UsageInfo};
use schannel_fetch::parser::{parse_invoices, parse_services, parse_usage_info};
use schannel_fetch::{FetchError, PageSource, SitePages, SiteUrls};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use crate::error::StoreError;

/// Age at which the snapshot is refetched.
pub const CACHE_TTL: Duration = Duration::from_secs(20 * 60);

// ============================================================================
// Inner State
// ============================================================================

struct BridgeState {
    cookies: Vec<SessionCookie>,
    proxy_url: String,
    /// Monotonic time for the TTL, wall time for display.
    refreshed: Option<(Instant, DateTime<Utc>)>,
    usage_infos: Vec<UsageInfo>,
    invoices: Vec<Invoice>,
}

impl BridgeState {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.refreshed.is_some_and(|(at, _)| at.elapsed() < ttl)
    }
}

/// A complete set of freshly parsed pages.
struct Snapshot {
    usage_infos: Vec<UsageInfo>,
    invoices: Vec<Invoice>,
}

// ============================================================================
// Data Bridge
// ============================================================================

/// TTL cache over a [`PageSource`].
pub struct DataBridge<S = SitePages> {
    source: S,
    ttl: Duration,
    span: Span,
    state: Mutex<BridgeState>,
}

impl DataBridge<SitePages> {
    /// Creates a bridge over the live site.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` for a bad proxy URL.
    pub fn new(
        cookies: Vec<SessionCookie>,
        proxy_url: &str,
        site: SiteUrls,
    ) -> Result<Self, StoreError> {
        let source = SitePages::new(site, proxy_url, cookies.clone())?;
        let mut bridge = Self::with_source(cookies, source);
        bridge.state.get_mut().proxy_url = proxy_url.to_string();
        Ok(bridge)
    }
}

impl<S: PageSource> DataBridge<S> {
    /// Creates a bridge over any page source.
    pub fn with_source(cookies: Vec<SessionCookie>, source: S) -> Self {
        let span = info_span!("data_bridge", site = %source.site().root());
        Self {
            source,
            ttl: CACHE_TTL,
            span,
            state: Mutex::new(BridgeState {
                cookies,
                proxy_url: String::new(),
                refreshed: None,
                usage_infos: Vec::new(),
                invoices: Vec::new(),
            }),
        }
    }

    /// Overrides the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    // ========================================================================
    // Cached reads
    // ========================================================================

    /// Services of the account, in page order.
    pub async fn service_infos(&self) -> Vec<Service> {
        let state = self.fresh_state().await;
        state.usage_infos.iter().map(|i| i.service.clone()).collect()
    }

    /// Usage details of `service`, matched by full value.
    pub async fn usage_info(&self, service: &Service) -> Option<UsageInfo> {
        let state = self.fresh_state().await;
        state
            .usage_infos
            .iter()
            .find(|i| i.service == *service)
            .cloned()
    }

    /// Usage details of every service.
    pub async fn usage_infos(&self) -> Vec<UsageInfo> {
        self.fresh_state().await.usage_infos.clone()
    }

    /// Invoices of the account, in page order.
    pub async fn invoices(&self) -> Vec<Invoice> {
        self.fresh_state().await.invoices.clone()
    }

    // ========================================================================
    // Getters (no refresh)
    // ========================================================================

    /// Login cookies this bridge fetches with.
    pub async fn cookies(&self) -> Vec<SessionCookie> {
        self.state.lock().await.cookies.clone()
    }

    /// Proxy URL this bridge was built with; empty for direct.
    pub async fn proxy_url(&self) -> String {
        self.state.lock().await.proxy_url.clone()
    }

    /// Wall-clock time of the last successful refresh.
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.refreshed.map(|(_, at)| at)
    }

    /// Page source the bridge reads from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Logging context of this bridge; refresh failures are reported in it.
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    async fn fresh_state(&self) -> MutexGuard<'_, BridgeState> {
        let mut state = self.state.lock().await;
        if !state.is_fresh(self.ttl) {
            self.refresh(&mut state).instrument(self.span.clone()).await;
        }
        state
    }

    /// Replaces the snapshot, or keeps the old one if any page fails.
    async fn refresh(&self, state: &mut BridgeState) {
        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                info!(
                    services = snapshot.usage_infos.len(),
                    invoices = snapshot.invoices.len(),
                    "Account data refreshed"
                );
                state.usage_infos = snapshot.usage_infos;
                state.invoices = snapshot.invoices;
                state.refreshed = Some((Instant::now(), Utc::now()));
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping cached data");
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let site = self.source.site();

        let services = parse_services(&self.source.service_list().await?, site);
        debug!(count = services.len(), "Fetching service details");

        let mut usage_infos = Vec::with_capacity(services.len());
        for service in &services {
            let html = self.source.service_detail(service).await?;
            usage_infos.push(parse_usage_info(&html, service)?);
        }

        let invoices = parse_invoices(&self.source.invoice_list().await?, site);

        Ok(Snapshot {
            usage_infos,
            invoices,
        })
    }
}
