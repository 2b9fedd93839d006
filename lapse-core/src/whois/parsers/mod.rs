//! Registry-specific WHOIS response parsers.
//!
//! Most registries answer with `Label: value` lines that the generic parser
//! handles. Registries with their own layout get a parser here, selected by
//! TLD, which may also hint at the date formats the registry uses.

mod generic;
mod nominet;

use once_cell::sync::Lazy;

use super::parser::WhoisRecord;
pub use generic::GenericParser;
pub use nominet::NominetParser;

/// Trait for registry-specific WHOIS parsers.
pub trait RegistryParser: Send + Sync {
    /// Returns the TLDs this parser handles.
    fn supported_tlds(&self) -> &[&str];

    /// Parses a raw WHOIS response into a record.
    fn parse(&self, domain: &str, server: &str, raw: &str) -> WhoisRecord;
}

/// Registry of all available parsers, falling back to the generic one.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn RegistryParser>>,
    fallback: GenericParser,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(NominetParser::new()), // .uk, .co.uk
            ],
            fallback: GenericParser::new(),
        }
    }

    /// Parses a WHOIS response using the appropriate parser for the TLD.
    pub fn parse(&self, domain: &str, server: &str, raw: &str) -> WhoisRecord {
        let tld = extract_tld(domain);
        let sld_tld = extract_second_level_tld(domain);

        for parser in &self.parsers {
            let supported = parser.supported_tlds();
            // Second-level match first (e.g., "co.uk"), then the TLD
            if let Some(sld) = &sld_tld {
                if supported.contains(&sld.as_str()) {
                    return parser.parse(domain, server, raw);
                }
            }
            if let Some(tld) = &tld {
                if supported.contains(&tld.as_str()) {
                    return parser.parse(domain, server, raw);
                }
            }
        }

        self.fallback.parse(domain, server, raw)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub static PARSER_REGISTRY: Lazy<ParserRegistry> = Lazy::new(ParserRegistry::new);

fn extract_tld(domain: &str) -> Option<String> {
    domain.rsplit('.').next().map(|s| s.to_lowercase())
}

/// "co.uk" from "example.co.uk".
fn extract_second_level_tld(domain: &str) -> Option<String> {
    let parts: Vec<&str> = domain.rsplit('.').collect();
    if parts.len() >= 2 {
        Some(format!("{}.{}", parts[1].to_lowercase(), parts[0].to_lowercase()))
    } else {
        None
    }
}
