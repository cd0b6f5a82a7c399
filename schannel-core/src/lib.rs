// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # schannel Core
//!
//! Core types, models, and traits for the schannel account client.
//!
//! This crate provides the foundational abstractions used across all other
//! schannel crates, including:
//!
//! - Domain models (services, usage, proxy nodes, invoices, cookies)
//! - Error types
//! - The persistence seam for daily usage snapshots
//!
//! ## Key Types
//!
//! ### Account Types
//! - [`Service`] - One purchased subscription
//! - [`UsageInfo`] - Usage and endpoint details for a service
//! - [`ProxyNode`] - A proxy node available to a service
//! - [`Invoice`] - A billing record
//!
//! ### Session Types
//! - [`SessionCookie`] - A cookie captured during login
//!
//! ### Usage Accounting
//! - [`DataSize`] - Unit-suffixed quota strings converted to kilobytes
//! - [`UsageAmounts`] - Total/upload/download in kilobytes
//! - [`DailyUsage`] - One day of recorded usage for a service

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Session
    SessionCookie,
    cookie_header,
    // Account
    Invoice,
    InvoiceStatus,
    PaymentState,
    ProxyNode,
    Service,
    UsageInfo,
    // Usage accounting
    DailyUsage,
    DataSize,
    UsageAmounts,
};

// Re-export traits
pub use traits::UsageRecorder;
