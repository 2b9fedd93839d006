//! Domain expiration checking: WHOIS lookups, registrar date normalization,
//! threshold evaluation and email alerts.

pub mod check;
pub mod colors;
pub mod config;
pub mod date;
pub mod error;
pub mod notify;
pub mod output;
pub mod validation;
pub mod whois;

pub use error::{ErrorKind, LapseError, Result};
pub use validation::normalize_domain;

pub use check::{
    evaluate, parse_domain_file, CheckResult, DomainRecord, DomainTarget, ExpirationChecker,
    ExpirationStatus, ProgressCallback,
};
pub use config::{RunConfig, SmtpConfig};
pub use date::{days_remaining, normalize, should_alert, DateNormalizer, DatePattern, FormatHint};
pub use notify::{EmailNotifier, Notification};
pub use output::{OutputFormat, OutputFormatter};
pub use whois::{WhoisClient, WhoisRecord};
