use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// A domain to check and the number of days before expiry that should trigger an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTarget {
    pub domain: String,
    pub threshold_days: u32,
}

impl DomainTarget {
    pub fn new(domain: impl Into<String>, threshold_days: u32) -> Self {
        Self {
            domain: domain.into(),
            threshold_days,
        }
    }
}

/// Registration details for one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Domain as queried
    pub domain: String,
    /// Registrar of record; informational only
    pub registrar: String,
    /// Normalized expiration date
    pub expiration: NaiveDate,
    /// Alert threshold in days
    pub threshold_days: u32,
}

/// Outcome of evaluating a record against its threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpirationStatus {
    #[serde(flatten)]
    pub record: DomainRecord,
    /// Negative once the domain has expired
    pub days_remaining: i64,
    pub alert: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub target: DomainTarget,
    pub success: bool,
    pub status: Option<ExpirationStatus>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub duration_ms: u64,
}

impl CheckResult {
    pub fn is_alert(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.alert)
    }
}
