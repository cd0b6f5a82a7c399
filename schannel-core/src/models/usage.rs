//! Usage-related types.
//!
//! This module contains types related to usage tracking:
//! - [`UsageInfo`] - Per-service usage, endpoint, and node list
//! - [`DataSize`] - A quota string such as `16.14GB` in kilobytes
//! - [`UsageAmounts`] - The numeric form of a usage snapshot

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::node::ProxyNode;
use super::service::Service;
use crate::error::CoreError;

/// Share of the total quota above which usage counts as high.
const HIGH_USAGE_RATIO: f64 = 0.9;

// ============================================================================
// Usage Info
// ============================================================================

/// Usage snapshot for a single service.
///
/// Quota fields keep the unit-suffixed display strings the site shows; use
/// [`UsageInfo::amounts`] for numeric values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    /// The service this usage belongs to.
    pub service: Service,
    /// Proxy port shared by all nodes of this service.
    pub port: u16,
    /// Proxy password shared by all nodes of this service.
    pub password: String,
    /// Total quota (e.g. "50GB").
    pub total: String,
    /// Used quota.
    pub used: String,
    /// Uploaded amount.
    pub upload: String,
    /// Downloaded amount.
    pub download: String,
    /// Nodes available to this service.
    #[serde(default)]
    pub nodes: Vec<ProxyNode>,
}

impl UsageInfo {
    /// Creates an empty usage info for a service.
    pub fn new(service: Service) -> Self {
        Self {
            service,
            port: 0,
            password: String::new(),
            total: String::new(),
            used: String::new(),
            upload: String::new(),
            download: String::new(),
            nodes: Vec::new(),
        }
    }

    /// Converts the display strings into kilobyte amounts.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if any field is not a number followed
    /// by `KB`, `MB` or `GB`.
    pub fn amounts(&self) -> Result<UsageAmounts, CoreError> {
        Ok(UsageAmounts {
            total_kb: self.total.parse::<DataSize>()?.kilobytes(),
            used_kb: self.used.parse::<DataSize>()?.kilobytes(),
            upload_kb: self.upload.parse::<DataSize>()?.kilobytes(),
            download_kb: self.download.parse::<DataSize>()?.kilobytes(),
        })
    }

    /// Returns true once used data reaches 90% of the total quota.
    ///
    /// Returns false when the amounts cannot be parsed.
    pub fn is_near_limit(&self) -> bool {
        self.amounts().is_ok_and(|a| a.used_ratio() >= HIGH_USAGE_RATIO)
    }

    /// Finds a node by name.
    pub fn node(&self, name: &str) -> Option<&ProxyNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

// ============================================================================
// Usage Amounts
// ============================================================================

/// Usage of a service in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageAmounts {
    /// Total quota.
    pub total_kb: u64,
    /// Used amount.
    pub used_kb: u64,
    /// Uploaded amount.
    pub upload_kb: u64,
    /// Downloaded amount.
    pub download_kb: u64,
}

impl UsageAmounts {
    /// Fraction of the quota used, in `[0, 1]` for sane data.
    #[allow(clippy::cast_precision_loss)]
    pub fn used_ratio(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        self.used_kb as f64 / self.total_kb as f64
    }

    /// Quota left, saturating at zero.
    pub fn remaining_kb(&self) -> u64 {
        self.total_kb.saturating_sub(self.used_kb)
    }
}

// ============================================================================
// Data Size
// ============================================================================

const KB: u64 = 1;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// An amount of data, stored in kilobytes.
///
/// Parses the site's `<number><unit>` strings where unit is `KB`, `MB` or
/// `GB` (binary multiples). Fractions below one kilobyte are truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DataSize(u64);

impl DataSize {
    /// Creates a size from kilobytes.
    pub const fn from_kilobytes(kb: u64) -> Self {
        Self(kb)
    }

    /// Returns the size in kilobytes.
    pub const fn kilobytes(self) -> u64 {
        self.0
    }

    /// Returns the largest unit in which this size is at least one, with its
    /// multiplier in kilobytes.
    pub fn display_unit(self) -> (&'static str, u64) {
        if self.0 >= GB {
            ("GB", GB)
        } else if self.0 >= MB {
            ("MB", MB)
        } else {
            ("KB", KB)
        }
    }
}

impl FromStr for DataSize {
    type Err = CoreError;

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (number, ratio) = if let Some(n) = s.strip_suffix("GB") {
            (n, GB)
        } else if let Some(n) = s.strip_suffix("MB") {
            (n, MB)
        } else if let Some(n) = s.strip_suffix("KB") {
            (n, KB)
        } else {
            return Err(CoreError::InvalidData(format!("unknown data unit in {s:?}")));
        };

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidData(format!("invalid data amount {s:?}")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::InvalidData(format!("invalid data amount {s:?}")));
        }

        Ok(Self((value * ratio as f64) as u64))
    }
}

impl fmt::Display for DataSize {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, ratio) = self.display_unit();
        write!(f, "{:.2}{unit}", self.0 as f64 / ratio as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(total: &str, used: &str) -> UsageInfo {
        let service = Service {
            name: "Basic".to_string(),
            link: "https://www.schannel.net/clientarea.php?action=productdetails&id=1".to_string(),
            price: "10.00".to_string(),
            expires: None,
            state: "Active".to_string(),
        };
        let mut info = UsageInfo::new(service);
        info.total = total.to_string();
        info.used = used.to_string();
        info.upload = "14.66MB".to_string();
        info.download = "16.12GB".to_string();
        info
    }

    #[test]
    fn test_data_size_units() {
        assert_eq!("1KB".parse::<DataSize>().unwrap().kilobytes(), 1);
        assert_eq!("1MB".parse::<DataSize>().unwrap().kilobytes(), 1024);
        assert_eq!("50GB".parse::<DataSize>().unwrap().kilobytes(), 50 * 1024 * 1024);
        assert_eq!("0.5MB".parse::<DataSize>().unwrap().kilobytes(), 512);
    }

    #[test]
    fn test_data_size_rejects_garbage() {
        assert!("".parse::<DataSize>().is_err());
        assert!("12TB".parse::<DataSize>().is_err());
        assert!("abcGB".parse::<DataSize>().is_err());
        assert!("-1GB".parse::<DataSize>().is_err());
    }

    #[test]
    fn test_data_size_display_picks_largest_unit() {
        assert_eq!(DataSize::from_kilobytes(512).to_string(), "512.00KB");
        assert_eq!(DataSize::from_kilobytes(1536).to_string(), "1.50MB");
        assert_eq!(DataSize::from_kilobytes(2 * GB).to_string(), "2.00GB");
    }

    #[test]
    fn test_amounts() {
        let amounts = info("50GB", "16.14GB").amounts().unwrap();
        assert_eq!(amounts.total_kb, 50 * GB);
        assert_eq!(amounts.upload_kb, (14.66 * 1024.0) as u64);
        assert!(amounts.used_ratio() > 0.3 && amounts.used_ratio() < 0.33);
    }

    #[test]
    fn test_near_limit() {
        assert!(!info("50GB", "16.14GB").is_near_limit());
        assert!(info("50GB", "45GB").is_near_limit());
        assert!(!info("", "45GB").is_near_limit());
    }

    #[test]
    fn test_remaining_saturates() {
        let amounts = UsageAmounts {
            total_kb: 10,
            used_kb: 20,
            ..Default::default()
        };
        assert_eq!(amounts.remaining_kb(), 0);
    }
}
