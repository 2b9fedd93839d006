use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::check::ExpirationStatus;

/// What an alert says about one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub domain: String,
    pub registrar: String,
    pub expiration: NaiveDate,
    pub days_remaining: i64,
}

impl From<&ExpirationStatus> for Notification {
    fn from(status: &ExpirationStatus) -> Self {
        Self {
            domain: status.record.domain.clone(),
            registrar: status.record.registrar.clone(),
            expiration: status.record.expiration,
            days_remaining: status.days_remaining,
        }
    }
}

impl Notification {
    pub fn subject(&self) -> String {
        format!(
            "The DNS Domain {} is set to expire in {} days",
            self.domain, self.days_remaining
        )
    }

    pub fn body(&self) -> String {
        format!(
            "Time to renew {}\n\nRegistrar: {}\nExpiration date: {}\n",
            self.domain,
            self.registrar,
            self.expiration.format("%Y-%m-%d")
        )
    }
}

/// Renders a plain-text message with CRLF line endings, ready for `DATA`.
/// Dot-stuffing is left to the transport.
pub fn compose_message(
    notification: &Notification,
    from: &str,
    to: &str,
    sent_at: DateTime<FixedOffset>,
) -> String {
    let headers = [
        format!("From: {}", header_value(from)),
        format!("To: {}", header_value(to)),
        format!("Subject: {}", header_value(&notification.subject())),
        format!("Date: {}", sent_at.to_rfc2822()),
        "MIME-Version: 1.0".to_string(),
        "Content-Type: text/plain; charset=utf-8".to_string(),
        "Content-Transfer-Encoding: 8bit".to_string(),
    ];

    let mut message = headers.join("\r\n");
    message.push_str("\r\n\r\n");
    for line in notification.body().lines() {
        message.push_str(line);
        message.push_str("\r\n");
    }
    message
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
