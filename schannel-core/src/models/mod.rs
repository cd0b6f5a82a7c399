//! Domain models for schannel.
//!
//! This module contains the core data structures scraped from the account
//! pages and the records derived from them.
//!
//! ## Submodules
//!
//! - [`cookie`] - Session cookies captured at login
//! - [`service`] - Purchased services
//! - [`usage`] - Usage info, data sizes, and amounts
//! - [`node`] - Proxy nodes and their client config form
//! - [`invoice`] - Invoices and payment state
//! - [`history`] - Daily usage records

mod cookie;
mod history;
mod invoice;
mod node;
mod service;
mod usage;

// Re-export everything at the models level
pub use cookie::{SessionCookie, cookie_header};
pub use history::DailyUsage;
pub use invoice::{Invoice, InvoiceStatus, PaymentState};
pub use node::ProxyNode;
pub use service::Service;
pub use usage::{DataSize, UsageAmounts, UsageInfo};
