//! Purchased service types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A purchased subscription as listed on the service page.
///
/// Services have no separate identifier; two services are the same service
/// exactly when every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Absolute link to the service detail page.
    pub link: String,
    /// Price as displayed (e.g. "¥15.00 CNY Monthly").
    pub price: String,
    /// Expiration date, if the page carried a parseable one.
    pub expires: Option<NaiveDate>,
    /// Status text (active, suspended, ...).
    pub state: String,
}

impl Service {
    /// Returns true if the service expired before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires.is_some_and(|d| d < today)
    }
}
