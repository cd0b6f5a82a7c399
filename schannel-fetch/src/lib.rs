// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # schannel Fetch
//!
//! HTTP access to the schannel account site.
//!
//! - [`session`] - client plus cookie jar, optionally behind a proxy
//! - [`client`] - page requests with the browser headers the site expects
//! - [`login`] - CSRF token fetch and credential POST
//! - [`parser`] - HTML parsers for the account pages
//! - [`pages`] - [`PageSource`] seam over the logged-in pages
//!
//! ## Example
//!
//! ```ignore
//! use schannel_fetch::{LoginFlow, SitePages, SiteUrls};
//!
//! let site = SiteUrls::default();
//! let cookies = LoginFlow::new(site.clone(), "").authenticate("me", "pw").await?;
//! let pages = SitePages::new(site, "", cookies)?;
//! let html = pages.service_list().await?;
//! ```

pub mod client;
pub mod error;
pub mod login;
pub mod pages;
pub mod parser;
pub mod session;
pub mod site;

#[cfg(test)]
mod parser_tests;

pub use client::{FetchedPage, PageRequest};
pub use error::{FetchError, LoginError};
pub use login::{CDN_SESSION_COOKIE, LoginFlow};
pub use pages::{PageSource, SitePages};
pub use session::{Session, SessionOptions, parse_proxy_url, parse_public_suffix_list};
pub use site::{DEFAULT_SITE_URL, SiteUrls};
