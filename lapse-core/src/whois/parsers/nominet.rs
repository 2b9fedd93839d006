//! Parser for .uk domains (Nominet format).
//!
//! Nominet uses indented sections. The registrar sits on the line after its
//! heading; the expiry date is either inline under "Relevant dates" or, in
//! older output, on the line after its own heading.
//!
//! ```text
//! Registrar:
//!     Example Registrar Ltd [Tag = EXAMPLE]
//!     URL: https://registrar.example
//!
//! Relevant dates:
//!     Registered on: 11-Jun-1996
//!     Expiry date:  23-Jun-2020
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::RegistryParser;
use crate::date::{DatePattern, FormatHint};
use crate::whois::parser::{is_meaningful, WhoisRecord};

/// Nominet writes `DD-Mon-YYYY`. Numeric dates seen on .uk registrar
/// servers are British day-first, which the generic table would read
/// month-first.
pub static NOMINET_DATE_PATTERNS: &[DatePattern] = &[
    DatePattern::date("nominet-day-month-name", "%d-%B-%Y"),
    DatePattern::datetime("nominet-slash-dmy-datetime", "%d/%m/%Y %H:%M:%S"),
    DatePattern::date("nominet-slash-dmy", "%d/%m/%Y"),
    DatePattern::date("nominet-dash-dmy", "%d-%m-%Y"),
];

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Registrar|Expiry date):\s*(.*)$").expect("Invalid Nominet heading regex")
});

static REGISTRAR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[Tag = [^\]]*\]\s*$").expect("Invalid Nominet tag regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Registrar,
    ExpiryDate,
}

#[derive(Debug, Clone, Default)]
pub struct NominetParser;

impl NominetParser {
    pub fn new() -> Self {
        Self
    }

    fn clean_registrar(value: &str) -> String {
        REGISTRAR_TAG.replace(value, "").trim().to_string()
    }
}

impl RegistryParser for NominetParser {
    fn supported_tlds(&self) -> &[&str] {
        &[
            "uk", "co.uk", "org.uk", "me.uk", "ltd.uk", "plc.uk", "net.uk", "sch.uk",
        ]
    }

    fn parse(&self, domain: &str, server: &str, raw: &str) -> WhoisRecord {
        let mut registrar = None;
        let mut expiration_text = None;
        let mut section = Section::None;

        for line in raw.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                section = Section::None;
                continue;
            }

            if let Some(caps) = HEADING.captures(trimmed) {
                let heading = if caps[1].eq_ignore_ascii_case("registrar") {
                    Section::Registrar
                } else {
                    Section::ExpiryDate
                };
                let inline = caps[2].trim();

                if inline.is_empty() {
                    section = heading;
                } else {
                    section = Section::None;
                    match heading {
                        Section::Registrar if registrar.is_none() => {
                            registrar = Some(Self::clean_registrar(inline));
                        }
                        Section::ExpiryDate if expiration_text.is_none() => {
                            expiration_text = Some(inline.to_string());
                        }
                        _ => {}
                    }
                }
                continue;
            }

            match section {
                Section::Registrar if registrar.is_none() => {
                    registrar = Some(Self::clean_registrar(trimmed));
                }
                Section::ExpiryDate if expiration_text.is_none() => {
                    expiration_text = Some(trimmed.to_string());
                }
                _ => {}
            }
            section = Section::None;
        }

        let mut record = WhoisRecord::parse_generic(domain, server, raw);
        record.registrar = registrar.filter(|r| is_meaningful(r)).or(record.registrar);
        record.expiration_text = expiration_text
            .filter(|e| is_meaningful(e))
            .or(record.expiration_text);
        record.format_hint = FormatHint::Registry(NOMINET_DATE_PATTERNS);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::normalize_with_hint;
    use chrono::NaiveDate;

    const SAMPLE_NOMINET_RESPONSE: &str = r#"
    Domain name:
        example.co.uk

    Data validation:
        Nominet was able to match the registrant's name and address against a 3rd party data source on 10-Dec-2012

    Registrar:
        Example Registrar Ltd t/a Example [Tag = EXAMPLE]
        URL: https://registrar.example

    Relevant dates:
        Registered on: 11-Jun-1996
        Expiry date:  23-Jun-2020
        Last updated:  21-May-2019

    Registration status:
        Registered until expiry date.
"#;

    const LEGACY_NOMINET_RESPONSE: &str = r#"
Domain name:
    example.co.uk

Registrar:
    Example Ltd

Expiry date:
    01-January-2025
"#;

    #[test]
    fn test_nominet_inline_expiry() {
        let parser = NominetParser::new();
        let record = parser.parse("example.co.uk", "whois.nic.uk", SAMPLE_NOMINET_RESPONSE);

        assert_eq!(record.expiration_text.as_deref(), Some("23-Jun-2020"));
        assert_eq!(
            record.registrar.as_deref(),
            Some("Example Registrar Ltd t/a Example")
        );
    }

    #[test]
    fn test_nominet_section_expiry() {
        let parser = NominetParser::new();
        let record = parser.parse("example.co.uk", "whois.nic.uk", LEGACY_NOMINET_RESPONSE);

        assert_eq!(record.expiration_text.as_deref(), Some("01-January-2025"));
        assert_eq!(record.registrar.as_deref(), Some("Example Ltd"));
    }

    #[test]
    fn test_nominet_dates_normalize_with_hint() {
        let parser = NominetParser::new();
        let record = parser.parse("example.co.uk", "whois.nic.uk", LEGACY_NOMINET_RESPONSE);
        let text = record.expiration_text.as_deref().unwrap();

        assert_eq!(
            normalize_with_hint(text, record.format_hint).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_numeric_uk_dates_are_day_first() {
        let parser = NominetParser::new();
        let raw = "Registrar: Example Ltd\nExpiry date: 01/02/2025\n";
        let record = parser.parse("example.co.uk", "whois.nic.uk", raw);
        let text = record.expiration_text.as_deref().unwrap();

        assert_eq!(
            normalize_with_hint(text, record.format_hint).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
        assert_eq!(
            crate::date::normalize(text).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_supported_tlds() {
        let parser = NominetParser::new();
        assert!(parser.supported_tlds().contains(&"co.uk"));
        assert!(parser.supported_tlds().contains(&"uk"));
    }
}
