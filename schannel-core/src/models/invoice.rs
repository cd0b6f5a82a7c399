//! Invoice types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Not paid yet.
    #[default]
    Unpaid,
    /// Paid.
    Paid,
}

/// A billing record from the invoice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number.
    pub number: String,
    /// Absolute link to the invoice page.
    pub link: String,
    /// Invoice date.
    pub start_date: Option<NaiveDate>,
    /// Due date.
    pub expire_date: Option<NaiveDate>,
    /// Amount due, in the site's smallest listed unit.
    pub payment: i64,
    /// Payment state.
    pub state: PaymentState,
}

/// Invoice state relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    /// Paid, due date not passed.
    Paid,
    /// Paid, due date passed.
    PaidExpired,
    /// Payment needed.
    Unpaid,
    /// Payment needed and the due date has passed.
    UnpaidOverdue,
}

impl InvoiceStatus {
    /// Returns true if no payment is needed.
    pub fn is_paid(self) -> bool {
        matches!(self, Self::Paid | Self::PaidExpired)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Paid => "no payment needed",
            Self::PaidExpired => "no payment needed, invoice expired",
            Self::Unpaid => "payment needed",
            Self::UnpaidOverdue => "payment needed, invoice overdue",
        };
        f.write_str(label)
    }
}

impl Invoice {
    /// Returns the status of this invoice as seen on `today`.
    ///
    /// An invoice whose due date is today is not yet expired.
    pub fn status(&self, today: NaiveDate) -> InvoiceStatus {
        let expired = self.expire_date.is_some_and(|d| d < today);
        match (self.state, expired) {
            (PaymentState::Paid, false) => InvoiceStatus::Paid,
            (PaymentState::Paid, true) => InvoiceStatus::PaidExpired,
            (PaymentState::Unpaid, false) => InvoiceStatus::Unpaid,
            (PaymentState::Unpaid, true) => InvoiceStatus::UnpaidOverdue,
        }
    }
}
