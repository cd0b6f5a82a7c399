//! Daily usage records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::usage::UsageAmounts;

/// Usage recorded for one service on one day.
///
/// Keyed by `(user, service, date)`; a day holds at most one record per
/// user and service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Account name.
    pub user: String,
    /// Service name.
    pub service: String,
    /// Day of the record.
    pub date: NaiveDate,
    /// Total quota in kilobytes.
    pub total_kb: u64,
    /// Uploaded kilobytes.
    pub upload_kb: u64,
    /// Downloaded kilobytes.
    pub download_kb: u64,
}

impl DailyUsage {
    /// Creates a record from usage amounts.
    pub fn new(
        user: impl Into<String>,
        service: impl Into<String>,
        date: NaiveDate,
        amounts: &UsageAmounts,
    ) -> Self {
        Self {
            user: user.into(),
            service: service.into(),
            date,
            total_kb: amounts.total_kb,
            upload_kb: amounts.upload_kb,
            download_kb: amounts.download_kb,
        }
    }

    /// Returns true if this record has the given key.
    pub fn is_for(&self, user: &str, service: &str, date: NaiveDate) -> bool {
        self.user == user && self.service == service && self.date == date
    }

    /// Upload plus download.
    pub fn used_kb(&self) -> u64 {
        self.upload_kb.saturating_add(self.download_kb)
    }
}
