//! Daily usage history.
//!
//! One [`DailyUsage`] per `(user, service, date)`, kept in a JSON file.

use chrono::{Days, NaiveDate};
use schannel_core::{CoreError, DailyUsage, Service, UsageAmounts, UsageRecorder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::persistence::{default_history_path, load_json_if_exists, save_json};

/// Number of days [`UsageHistory::recent`] returns.
pub const RECENT_DAYS: usize = 5;

// ============================================================================
// Usage History
// ============================================================================

/// In-memory set of daily usage records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageHistory {
    records: Vec<DailyUsage>,
}

impl UsageHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[DailyUsage] {
        &self.records
    }

    /// Inserts a record, or updates upload and download of the record with
    /// the same key. The total of an existing record is kept.
    pub fn upsert(&mut self, record: DailyUsage) {
        match self
            .records
            .iter_mut()
            .find(|r| r.is_for(&record.user, &record.service, record.date))
        {
            Some(existing) => {
                existing.upload_kb = record.upload_kb;
                existing.download_kb = record.download_kb;
            }
            None => self.records.push(record),
        }
    }

    /// Returns [`RECENT_DAYS`] records ending at `date`, newest first.
    ///
    /// When fewer exist, the oldest one found is copied back a day at a
    /// time to fill the list. No records yields an empty list.
    pub fn recent(&self, user: &str, service: &str, date: NaiveDate) -> Vec<DailyUsage> {
        let mut found: Vec<DailyUsage> = self
            .records
            .iter()
            .filter(|r| r.user == user && r.service == service && r.date <= date)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        found.truncate(RECENT_DAYS);

        if let Some(oldest) = found.last().cloned() {
            let mut day = oldest.date;
            while found.len() < RECENT_DAYS {
                let Some(previous) = day.checked_sub_days(Days::new(1)) else {
                    break;
                };
                day = previous;
                found.push(DailyUsage {
                    date: day,
                    ..oldest.clone()
                });
            }
        }

        found
    }

    /// Drops every record of `user`.
    pub fn remove_user(&mut self, user: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.user != user);
        before - self.records.len()
    }
}

// ============================================================================
// History Store
// ============================================================================

/// File-backed [`UsageHistory`].
///
/// Every save rewrites the file; access is serialized by an async mutex.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    history: Mutex<UsageHistory>,
}

impl HistoryStore {
    /// Opens the history at the default path.
    pub async fn open_default() -> Result<Self, StoreError> {
        Self::open(default_history_path()).await
    }

    /// Opens the history at `path`; a missing file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let history = load_json_if_exists(&path).await?.unwrap_or_default();
        debug!(path = %path.display(), "History opened");
        Ok(Self {
            path,
            history: Mutex::new(history),
        })
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts or updates a record and writes the file.
    #[instrument(skip(self, record), fields(user = %record.user, service = %record.service, date = %record.date))]
    pub async fn save(&self, record: DailyUsage) -> Result<(), StoreError> {
        let mut history = self.history.lock().await;
        history.upsert(record);
        save_json(&self.path, &*history).await
    }

    /// See [`UsageHistory::recent`].
    pub async fn recent(&self, user: &str, service: &str, date: NaiveDate) -> Vec<DailyUsage> {
        self.history.lock().await.recent(user, service, date)
    }

    /// Drops every record of `user` and writes the file.
    pub async fn remove_user(&self, user: &str) -> Result<usize, StoreError> {
        let mut history = self.history.lock().await;
        let removed = history.remove_user(user);
        if removed > 0 {
            save_json(&self.path, &*history).await?;
        }
        Ok(removed)
    }
}

impl UsageRecorder for HistoryStore {
    async fn save_usage_snapshot(
        &self,
        user: &str,
        service: &Service,
        amounts: UsageAmounts,
        date: NaiveDate,
    ) -> Result<(), CoreError> {
        self.save(DailyUsage::new(user, service.name.as_str(), date, &amounts))
            .await
            .map_err(CoreError::from)
    }
}
