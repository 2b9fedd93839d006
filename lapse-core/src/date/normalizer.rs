use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use super::patterns::{DatePattern, GENERIC_PATTERNS};
use crate::error::{LapseError, Result};

/// A time of day followed by a zone designator: `Z`, `+0000`, `-05:00`,
/// `UTC`, `(CEST)`. Only the time is kept.
static ZONE_AFTER_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)(?:\s*(?:[+-]\d{2}(?::?\d{2})?|\(?[A-Za-z]{1,5}\)?))+$",
    )
    .expect("Invalid zone suffix regex")
});

/// `Tue Jun 23 23:59:59 GMT 2020`: a zone name between the time and the year.
static ZONE_BEFORE_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}:\d{2}:\d{2})\s+\(?[A-Za-z]{2,5}\)?\s+(\d{4})$")
        .expect("Invalid zone before year regex")
});

static BARE_ZONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\(?\b(?:UTC|GMT)\)?$").expect("Invalid bare zone regex")
});

static DATE_ZULU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)[Zz]$").expect("Invalid zulu suffix regex"));

static REPEATED_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}|/{2,}|\.{2,}").expect("Invalid separator regex"));

/// `2020. 06. 23.`: a space after each dot and a dot after the day.
static SPACED_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)\.[ \t]+").expect("Invalid spaced dot regex"));

static TRAILING_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)\.$").expect("Invalid trailing dot regex"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Which patterns to prefer for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatHint {
    /// Only the generic table.
    #[default]
    Generic,
    /// A registry's own formats, tried before the generic table.
    Registry(&'static [DatePattern]),
}

/// Normalizes registrar expiration text using the generic format table.
pub fn normalize(raw: &str) -> Result<NaiveDate> {
    normalize_with_hint(raw, FormatHint::Generic)
}

/// Normalizes registrar expiration text, trying the hinted registry formats first.
pub fn normalize_with_hint(raw: &str, hint: FormatHint) -> Result<NaiveDate> {
    let preferred: &[DatePattern] = match hint {
        FormatHint::Generic => &[],
        FormatHint::Registry(patterns) => patterns,
    };

    match_patterns(raw, preferred.iter().chain(GENERIC_PATTERNS))
}

/// A normalizer over an explicit, ordered pattern list.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    patterns: Vec<DatePattern>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DateNormalizer {
    pub fn new() -> Self {
        Self::with_patterns(GENERIC_PATTERNS.to_vec())
    }

    pub fn with_patterns(patterns: Vec<DatePattern>) -> Self {
        Self { patterns }
    }

    /// Appends a pattern; it is tried after every existing one.
    pub fn with_pattern(mut self, pattern: DatePattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn patterns(&self) -> &[DatePattern] {
        &self.patterns
    }

    pub fn normalize(&self, raw: &str) -> Result<NaiveDate> {
        match_patterns(raw, self.patterns.iter())
    }
}

fn match_patterns<'a>(
    raw: &str,
    patterns: impl Iterator<Item = &'a DatePattern>,
) -> Result<NaiveDate> {
    let cleaned = clean(raw);

    if !cleaned.is_empty() {
        for pattern in patterns {
            if let Some(date) = pattern.parse(&cleaned) {
                debug!(raw = %raw, pattern = pattern.name, %date, "Normalized expiration date");
                return Ok(date);
            }
            trace!(pattern = pattern.name, "Pattern did not match");
        }
    }

    Err(LapseError::UnrecognizedFormat(raw.to_string()))
}

/// Light cleanup applied before any pattern is tried.
pub(crate) fn clean(raw: &str) -> String {
    let text = raw.trim();
    let text = ZONE_AFTER_TIME.replace(text, "$1");
    let text = ZONE_BEFORE_YEAR.replace(&text, "$1 $2");
    let text = BARE_ZONE.replace(&text, "");
    let text = DATE_ZULU.replace(&text, "$1");
    let text = text.replace(',', " ");
    let text = SPACED_DOT.replace_all(text.trim(), "$1.");
    let text = TRAILING_DOT.replace(&text, "$1");
    let text = REPEATED_SEPARATOR.replace_all(&text, |caps: &Captures| caps[0][..1].to_string());
    let text = WHITESPACE.replace_all(&text, " ");

    text.trim().to_string()
}
