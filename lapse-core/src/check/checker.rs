use std::future::Future;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::types::{CheckResult, DomainRecord, DomainTarget, ExpirationStatus};
use crate::date::{days_remaining, normalize_with_hint, should_alert};
use crate::error::{LapseError, Result};
use crate::whois::{WhoisClient, WhoisRecord};

/// Called after each target with (completed, total, result).
pub type ProgressCallback = Box<dyn Fn(usize, usize, &CheckResult) + Send + Sync>;

/// Registries rate-limit aggressively; one query a minute stays well clear.
pub const DEFAULT_QUERY_DELAY: Duration = Duration::from_secs(60);

/// Local calendar date, the reference point for days remaining.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Normalizes a record's expiration text and compares it against the threshold.
pub fn evaluate(
    record: &WhoisRecord,
    threshold_days: u32,
    today: NaiveDate,
) -> Result<ExpirationStatus> {
    let raw = record.expiration_text.as_deref().ok_or_else(|| {
        LapseError::LookupFailure(format!(
            "no expiration date in WHOIS record for {}",
            record.domain
        ))
    })?;

    let expiration = normalize_with_hint(raw, record.format_hint)?;
    let days = days_remaining(expiration, today);
    let alert = should_alert(days, i64::from(threshold_days));

    Ok(ExpirationStatus {
        record: DomainRecord {
            domain: record.domain.clone(),
            registrar: record.registrar_name().to_string(),
            expiration,
            threshold_days,
        },
        days_remaining: days,
        alert,
    })
}

#[derive(Debug, Clone)]
pub struct ExpirationChecker {
    whois_client: WhoisClient,
    query_delay: Duration,
}

impl Default for ExpirationChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpirationChecker {
    pub fn new() -> Self {
        Self {
            whois_client: WhoisClient::new(),
            query_delay: DEFAULT_QUERY_DELAY,
        }
    }

    pub fn with_client(mut self, client: WhoisClient) -> Self {
        self.whois_client = client;
        self
    }

    /// Pause between consecutive WHOIS queries.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    #[instrument(skip(self), fields(domain = %target.domain))]
    pub async fn check(&self, target: &DomainTarget, today: NaiveDate) -> Result<ExpirationStatus> {
        let record = self.whois_client.lookup(&target.domain).await?;
        evaluate(&record, target.threshold_days, today)
    }

    /// Checks every target in order, one at a time.
    ///
    /// Failures are recorded in the corresponding result; the batch always
    /// runs to the end.
    pub async fn run(
        &self,
        targets: Vec<DomainTarget>,
        progress: Option<ProgressCallback>,
    ) -> Vec<CheckResult> {
        self.run_with(targets, progress, |result| async move { result })
            .await
    }

    /// Like [`run`](Self::run), awaiting `on_result` for each result before
    /// the next target is queried.
    pub async fn run_with<F, Fut>(
        &self,
        targets: Vec<DomainTarget>,
        progress: Option<ProgressCallback>,
        on_result: F,
    ) -> Vec<CheckResult>
    where
        F: Fn(CheckResult) -> Fut,
        Fut: Future<Output = CheckResult>,
    {
        let total = targets.len();
        let today = today();
        let progress = progress.as_ref();
        let on_result = &on_result;

        debug!(total = total, delay_secs = self.query_delay.as_secs(), "Starting expiration run");

        stream::iter(targets.into_iter().enumerate())
            .then(|(index, target)| async move {
                if index > 0 && !self.query_delay.is_zero() {
                    sleep(self.query_delay).await;
                }

                let result = self.check_one(target, today).await;

                if let Some(progress) = progress {
                    progress(index + 1, total, &result);
                }
                on_result(result).await
            })
            .collect()
            .await
    }

    async fn check_one(&self, target: DomainTarget, today: NaiveDate) -> CheckResult {
        let start = Instant::now();
        let outcome = self.check(&target, today).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(status) => {
                if status.alert {
                    info!(
                        domain = %target.domain,
                        days_remaining = status.days_remaining,
                        "Domain is inside its alert window"
                    );
                }
                CheckResult {
                    target,
                    success: true,
                    status: Some(status),
                    error: None,
                    error_kind: None,
                    duration_ms,
                }
            }
            Err(e) => {
                warn!(domain = %target.domain, error = %e, "Expiration check failed");
                CheckResult {
                    target,
                    success: false,
                    status: None,
                    error: Some(e.to_string()),
                    error_kind: Some(e.kind()),
                    duration_ms,
                }
            }
        }
    }
}
