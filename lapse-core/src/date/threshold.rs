use chrono::NaiveDate;

/// Calendar days from `now` until `expiration`; negative once the domain has expired.
pub fn days_remaining(expiration: NaiveDate, now: NaiveDate) -> i64 {
    (expiration - now).num_days()
}

/// True when the remaining validity is at or below the threshold.
pub fn should_alert(days_remaining: i64, threshold: i64) -> bool {
    days_remaining <= threshold
}
