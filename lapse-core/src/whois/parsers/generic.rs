//! Fallback parser for `Label: value` responses.

use super::RegistryParser;
use crate::whois::parser::WhoisRecord;

#[derive(Debug, Clone, Default)]
pub struct GenericParser;

impl GenericParser {
    pub fn new() -> Self {
        Self
    }
}

impl RegistryParser for GenericParser {
    fn supported_tlds(&self) -> &[&str] {
        // Empty - this is the fallback parser
        &[]
    }

    fn parse(&self, domain: &str, server: &str, raw: &str) -> WhoisRecord {
        WhoisRecord::parse_generic(domain, server, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_parser_basic() {
        let parser = GenericParser::new();
        let raw = r#"
Domain Name: example.org
Registrar: Example Registrar, Inc.
Creation Date: 2020-01-15T00:00:00Z
Registry Expiry Date: 2025-01-15T00:00:00Z
"#;
        let record = parser.parse("example.org", "whois.pir.org", raw);

        assert_eq!(record.domain, "example.org");
        assert_eq!(record.registrar, Some("Example Registrar, Inc.".to_string()));
        assert_eq!(
            record.expiration_text,
            Some("2025-01-15T00:00:00Z".to_string())
        );
        assert_eq!(record.whois_server, "whois.pir.org");
    }
}
