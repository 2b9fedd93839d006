//! Registrar date formats observed in WHOIS output.
//!
//! The table is scanned top-down and the first pattern that consumes the
//! whole (cleaned) string wins. Supporting a new registrar format means
//! appending an entry here.
//!
//! Ordering rules:
//! - Formats with a time component come before their date-only prefix.
//! - Numeric dates separated by `/` or `-` are read month-first before
//!   day-first, so `01/02/2020` is January 2nd. `23/06/2020` only fits
//!   day-first and still parses. There is no way to tell the two apart
//!   without registrar metadata; registry parsers that know better pass a
//!   [`FormatHint`](super::FormatHint) instead.
//! - Dotted numeric dates are day-first (`23.06.2020`). The spaced form
//!   `2020. 06. 23.` used by .kr is tightened to `2020.06.23` during cleanup.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Registrations predate this year only in malformed output; a two-digit
/// year read through `%Y` would otherwise become year 20.
const MIN_YEAR: i32 = 1985;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// The format describes a calendar date only.
    Date,
    /// The format carries a time of day, which is parsed and then dropped.
    DateTime,
}

/// One entry of the format table: a chrono format string and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    pub name: &'static str,
    pub format: &'static str,
    pub kind: PatternKind,
}

impl DatePattern {
    pub const fn date(name: &'static str, format: &'static str) -> Self {
        Self {
            name,
            format,
            kind: PatternKind::Date,
        }
    }

    pub const fn datetime(name: &'static str, format: &'static str) -> Self {
        Self {
            name,
            format,
            kind: PatternKind::DateTime,
        }
    }

    /// Parses `text` with this pattern. The whole string must be consumed.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let date = match self.kind {
            PatternKind::Date => NaiveDate::parse_from_str(text, self.format).ok()?,
            PatternKind::DateTime => NaiveDateTime::parse_from_str(text, self.format)
                .ok()?
                .date(),
        };

        (date.year() >= MIN_YEAR).then_some(date)
    }
}

pub static GENERIC_PATTERNS: &[DatePattern] = &[
    // ISO 8601 and friends; `%.f` also matches when no fraction is present
    DatePattern::datetime("iso-datetime", "%Y-%m-%dT%H:%M:%S%.f"),
    DatePattern::datetime("iso-datetime-minutes", "%Y-%m-%dT%H:%M"),
    DatePattern::datetime("iso-space-datetime", "%Y-%m-%d %H:%M:%S%.f"),
    DatePattern::datetime("iso-space-minutes", "%Y-%m-%d %H:%M"),
    DatePattern::date("iso-date", "%Y-%m-%d"),
    // Year-first with other separators (.jp, .ru, .pl)
    DatePattern::datetime("slash-ymd-datetime", "%Y/%m/%d %H:%M:%S"),
    DatePattern::date("slash-ymd", "%Y/%m/%d"),
    DatePattern::datetime("dotted-ymd-datetime", "%Y.%m.%d %H:%M:%S"),
    DatePattern::date("dotted-ymd", "%Y.%m.%d"),
    DatePattern::date("compact-ymd", "%Y%m%d"),
    // Month names; `%B` accepts both `Jun` and `June`, in any case
    DatePattern::datetime("day-month-name-datetime", "%d-%B-%Y %H:%M:%S"),
    DatePattern::date("day-month-name", "%d-%B-%Y"),
    DatePattern::datetime("day-month-name-spaced-datetime", "%d %B %Y %H:%M:%S"),
    DatePattern::date("day-month-name-spaced", "%d %B %Y"),
    DatePattern::date("day-month-name-slashed", "%d/%B/%Y"),
    DatePattern::date("year-month-name-day", "%Y-%B-%d"),
    DatePattern::datetime("month-name-day-datetime", "%B %d %Y %H:%M:%S"),
    DatePattern::date("month-name-day", "%B %d %Y"),
    DatePattern::datetime("ctime", "%a %B %d %H:%M:%S %Y"),
    DatePattern::date("weekday-month-name-day", "%a %B %d %Y"),
    // RFC 2822 once the comma is gone: `Tue 23 Jun 2020 23:59:59`
    DatePattern::datetime("rfc2822-datetime", "%a %d %B %Y %H:%M:%S"),
    DatePattern::date("rfc2822-date", "%a %d %B %Y"),
    // Numeric, month-first before day-first
    DatePattern::datetime("slash-mdy-datetime", "%m/%d/%Y %H:%M:%S"),
    DatePattern::date("slash-mdy", "%m/%d/%Y"),
    DatePattern::datetime("slash-dmy-datetime", "%d/%m/%Y %H:%M:%S"),
    DatePattern::date("slash-dmy", "%d/%m/%Y"),
    DatePattern::date("dash-mdy", "%m-%d-%Y"),
    DatePattern::date("dash-dmy", "%d-%m-%Y"),
    // Dotted, day-first (.de, .ch, .cz)
    DatePattern::datetime("dotted-dmy-datetime", "%d.%m.%Y %H:%M:%S"),
    DatePattern::date("dotted-dmy", "%d.%m.%Y"),
];
