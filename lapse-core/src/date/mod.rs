//! Registrar date normalization and expiry arithmetic.
//!
//! WHOIS servers report expiration dates in whatever format the registry
//! prefers. [`normalize`] turns that text into a [`NaiveDate`](chrono::NaiveDate)
//! or fails with [`LapseError::UnrecognizedFormat`](crate::LapseError); it
//! never falls back to a placeholder date.

mod normalizer;
mod patterns;
mod threshold;

pub use normalizer::{normalize, normalize_with_hint, DateNormalizer, FormatHint};
pub use patterns::{DatePattern, PatternKind, GENERIC_PATTERNS};
pub use threshold::{days_remaining, should_alert};
