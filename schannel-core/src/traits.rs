//! Trait definitions for schannel.
//!
//! This module defines the seams between the account core and the
//! collaborators it calls out to.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::models::{Service, UsageAmounts};

/// Sink for per-day usage snapshots.
///
/// Implementors persist one record per `(user, service, date)`. Saving the
/// same key again on the same day updates the stored record instead of
/// adding a second one.
pub trait UsageRecorder: Send + Sync {
    /// Saves today's usage of `service` for `user`.
    fn save_usage_snapshot(
        &self,
        user: &str,
        service: &Service,
        amounts: UsageAmounts,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<(), CoreError>> + Send;
}
