//! WHOIS lookups: server selection, referral following, and extraction of
//! the registrar and raw expiration text from free-form responses.

mod client;
mod parser;
pub mod parsers;
mod servers;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{WhoisClient, WHOIS_PORT};
pub use parser::{WhoisRecord, UNKNOWN_REGISTRAR};
pub use servers::{get_tld, get_whois_server, IANA_WHOIS_SERVER};
