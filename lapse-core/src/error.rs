use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LapseError {
    #[error("Unrecognized expiration date format: {0:?}")]
    UnrecognizedFormat(String),

    #[error("WHOIS lookup failed: {0}")]
    LookupFailure(String),

    #[error("WHOIS server not found for TLD: {0}")]
    WhoisServerNotFound(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used when reporting per-domain failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnrecognizedFormat,
    LookupFailure,
    Configuration,
    Notification,
}

impl LapseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LapseError::UnrecognizedFormat(_) => ErrorKind::UnrecognizedFormat,
            LapseError::LookupFailure(_)
            | LapseError::WhoisServerNotFound(_)
            | LapseError::InvalidDomain(_)
            | LapseError::Timeout(_)
            | LapseError::Io(_) => ErrorKind::LookupFailure,
            LapseError::Smtp(_) => ErrorKind::Notification,
            LapseError::ConfigurationError(_) => ErrorKind::Configuration,
        }
    }

    /// Only configuration problems abort a run; everything else is scoped to one domain.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LapseError::ConfigurationError(_))
    }
}

pub type Result<T> = std::result::Result<T, LapseError>;
