use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::parsers::PARSER_REGISTRY;
use crate::date::FormatHint;

/// Registrar shown when a response does not name one.
pub const UNKNOWN_REGISTRAR: &str = "Unknown";

/// Expiration labels, most specific first. The registry's own date is
/// preferred over the registrar's copy when both appear.
static EXPIRATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?im)^\s*Registry Expiry Date:[ \t]*(.+)$",
        r"(?im)^\s*Registrar Registration Expiration Date:[ \t]*(.+)$",
        r"(?im)^\s*(?:Domain )?Expir(?:y|ation) Date:[ \t]*(.+)$",
        r"(?im)^\s*Expiration Time:[ \t]*(.+)$",
        r"(?im)^\s*Expires On:[ \t]*(.+)$",
        r"(?im)^\s*(?:Expiration|Expires|Expire):[ \t]*(.+)$",
        r"(?im)^\s*paid-till:[ \t]*(.+)$",
        r"(?im)^\s*Valid Until:[ \t]*(.+)$",
    ])
});

static REGISTRAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?im)^\s*Registrar:[ \t]*(.+)$",
        r"(?im)^\s*Registrar Name:[ \t]*(.+)$",
        r"(?im)^\s*Sponsoring Registrar:[ \t]*(.+)$",
        r"(?im)^\s*registrar-name:[ \t]*(.+)$",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("Invalid WHOIS field regex"))
        .collect()
}

/// The parts of a WHOIS response the expiration check needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub domain: String,
    pub registrar: Option<String>,
    /// Expiration date exactly as the server wrote it.
    pub expiration_text: Option<String>,
    #[serde(skip)]
    pub format_hint: FormatHint,
    pub whois_server: String,
    pub raw_response: String,
}

impl WhoisRecord {
    /// Parses a raw response with the parser registered for the domain's TLD.
    pub fn parse(domain: &str, whois_server: &str, raw: &str) -> Self {
        PARSER_REGISTRY.parse(domain, whois_server, raw)
    }

    pub(crate) fn parse_generic(domain: &str, whois_server: &str, raw: &str) -> Self {
        WhoisRecord {
            domain: domain.to_string(),
            registrar: extract_field(raw, &REGISTRAR_PATTERNS),
            expiration_text: extract_field(raw, &EXPIRATION_PATTERNS),
            format_hint: FormatHint::Generic,
            whois_server: whois_server.to_string(),
            raw_response: raw.to_string(),
        }
    }

    pub fn registrar_name(&self) -> &str {
        self.registrar.as_deref().unwrap_or(UNKNOWN_REGISTRAR)
    }

    pub fn is_available(&self) -> bool {
        let available_patterns = [
            "no match",
            "not found",
            "no data found",
            "no entries found",
            "status: free",
            "status: available",
            "domain not found",
            "no object found",
        ];

        let lower = self.raw_response.to_lowercase();
        available_patterns.iter().any(|p| lower.contains(p))
    }
}

fn extract_field(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns
        .iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|value| is_meaningful(value))
}

pub(crate) fn is_meaningful(value: &str) -> bool {
    !value.is_empty() && !value.to_lowercase().starts_with("redacted")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN_RESPONSE: &str = "   Domain Name: EXAMPLE.COM\r\n   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r\n   Registrar WHOIS Server: whois.iana.org\r\n   Updated Date: 2023-08-14T07:01:38Z\r\n   Creation Date: 1995-08-14T04:00:00Z\r\n   Registry Expiry Date: 2024-08-13T04:00:00Z\r\n   Registrar: RESERVED-Internet Assigned Numbers Authority\r\n   Registrar IANA ID: 376\r\n";

    #[test]
    fn test_verisign_record() {
        let record = WhoisRecord::parse_generic("example.com", "whois.verisign-grs.com", VERISIGN_RESPONSE);

        assert_eq!(
            record.expiration_text.as_deref(),
            Some("2024-08-13T04:00:00Z")
        );
        assert_eq!(
            record.registrar_name(),
            "RESERVED-Internet Assigned Numbers Authority"
        );
        assert!(!record.is_available());
    }

    #[test]
    fn test_registry_date_preferred_over_registrar_date() {
        let raw = "Registrar Registration Expiration Date: 2025-01-01T00:00:00Z\nRegistry Expiry Date: 2024-12-31T00:00:00Z\n";
        let record = WhoisRecord::parse_generic("example.com", "whois.example.net", raw);
        assert_eq!(
            record.expiration_text.as_deref(),
            Some("2024-12-31T00:00:00Z")
        );
    }

    #[test]
    fn test_paid_till_and_registrar_name() {
        let raw = "domain:        EXAMPLE.RU\nregistrar:     RU-CENTER-RU\npaid-till:     2020-06-23T21:00:00Z\n";
        let record = WhoisRecord::parse_generic("example.ru", "whois.tcinet.ru", raw);
        assert_eq!(record.expiration_text.as_deref(), Some("2020-06-23T21:00:00Z"));
        assert_eq!(record.registrar.as_deref(), Some("RU-CENTER-RU"));
    }

    #[test]
    fn test_short_labels_from_legacy_servers() {
        let raw = "domain: example.xx\nexpires: 23-jun-2020\n";
        let record = WhoisRecord::parse_generic("example.xx", "whois.example.xx", raw);
        assert_eq!(record.expiration_text.as_deref(), Some("23-jun-2020"));
    }

    #[test]
    fn test_empty_label_does_not_swallow_next_line() {
        let raw = "Registrar:\nRegistry Expiry Date: 2024-08-13T04:00:00Z\n";
        let record = WhoisRecord::parse_generic("example.com", "whois.verisign-grs.com", raw);
        assert_eq!(record.registrar, None);
        assert_eq!(record.registrar_name(), UNKNOWN_REGISTRAR);
    }

    #[test]
    fn test_redacted_values_are_skipped() {
        let raw = "Registrar: REDACTED FOR PRIVACY\nRegistrar Name: Example Registrar\n";
        let record = WhoisRecord::parse_generic("example.com", "whois.example.net", raw);
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar"));
    }

    #[test]
    fn test_available_domain() {
        let raw = "No match for \"UNREGISTERED-EXAMPLE.COM\".\r\n>>> Last update of whois database: 2024-01-01T00:00:00Z <<<\r\n";
        let record = WhoisRecord::parse_generic("unregistered-example.com", "whois.verisign-grs.com", raw);
        assert!(record.is_available());
        assert_eq!(record.expiration_text, None);
    }
}
