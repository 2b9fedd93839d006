use std::collections::HashSet;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::parser::WhoisRecord;
use super::servers::{get_tld, get_whois_server, IANA_WHOIS_SERVER};
use crate::error::{LapseError, Result};
use crate::validation::normalize_domain;

pub const WHOIS_PORT: u16 = 43;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB
const MAX_REFERRAL_DEPTH: u8 = 3;

static REFERRAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?im)^\s*Registrar WHOIS Server:[ \t]*(\S+)",
        r"(?im)^\s*Whois Server:[ \t]*(\S+)",
        r"(?im)^\s*refer:[ \t]*(\S+)",
        r"(?im)^\s*ReferralServer:[ \t]*whois://(\S+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid referral regex"))
    .collect()
});

#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
    port: u16,
    server: Option<String>,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            port: WHOIS_PORT,
            server: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Queries every server on this port instead of 43.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sends every first query to `server` instead of the TLD's registry.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn lookup(&self, domain: &str) -> Result<WhoisRecord> {
        let domain = normalize_domain(domain)?;
        let whois_server = self.initial_server(&domain)?;

        let mut visited = HashSet::new();
        let record = self
            .lookup_with_referrals(&domain, &whois_server, 0, &mut visited)
            .await?;

        if record.expiration_text.is_none() {
            if record.is_available() {
                return Err(LapseError::LookupFailure(format!(
                    "{} is not registered according to {}",
                    domain, record.whois_server
                )));
            }
            return Err(LapseError::LookupFailure(format!(
                "{} returned no expiration date for {}",
                record.whois_server, domain
            )));
        }

        Ok(record)
    }

    fn initial_server(&self, domain: &str) -> Result<String> {
        if let Some(server) = &self.server {
            return Ok(server.clone());
        }

        let tld = get_tld(domain).ok_or_else(|| LapseError::InvalidDomain(domain.to_string()))?;
        match get_whois_server(tld) {
            Some(server) => Ok(server.to_string()),
            None => {
                debug!(tld = %tld, "TLD not in server table, asking IANA");
                Ok(IANA_WHOIS_SERVER.to_string())
            }
        }
    }

    fn lookup_with_referrals<'a>(
        &'a self,
        domain: &'a str,
        whois_server: &'a str,
        depth: u8,
        visited: &'a mut HashSet<String>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<WhoisRecord>> + Send + 'a>>
    {
        Box::pin(async move {
            let server_lower = whois_server.to_lowercase();
            if visited.contains(&server_lower) {
                warn!(server = %whois_server, "Circular WHOIS referral detected");
                return Err(LapseError::LookupFailure(
                    "Circular WHOIS referral detected".to_string(),
                ));
            }
            visited.insert(server_lower);

            debug!(whois_server = %whois_server, depth = depth, "Querying WHOIS server");

            let raw_response = self.query_server(whois_server, domain).await?;
            let record = WhoisRecord::parse(domain, whois_server, &raw_response);

            if depth + 1 >= MAX_REFERRAL_DEPTH {
                return Ok(record);
            }

            let referral = extract_referral(&raw_response);

            if referral.is_none() && whois_server.eq_ignore_ascii_case(IANA_WHOIS_SERVER) {
                let tld = get_tld(domain).unwrap_or(domain);
                return Err(LapseError::WhoisServerNotFound(tld.to_string()));
            }

            if let Some(referral) = referral {
                if !visited.contains(&referral) {
                    debug!(referral = %referral, "Following referral");
                    match self
                        .lookup_with_referrals(domain, &referral, depth + 1, visited)
                        .await
                    {
                        Ok(referred) if referred.expiration_text.is_some() => return Ok(referred),
                        Ok(_) => {
                            debug!(referral = %referral, "Referral had no expiration date");
                        }
                        // Registrar servers are flakier than registries; keep what we have
                        Err(e) if record.expiration_text.is_some() => {
                            warn!(referral = %referral, error = %e, "Referral query failed");
                        }
                        Err(e) => return Err(e),
                    }
                }
            }

            Ok(record)
        })
    }

    async fn query_server(&self, server: &str, query: &str) -> Result<String> {
        let addr = format!("{}:{}", server, self.port);

        let mut stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| LapseError::Timeout(format!("Connection to {} timed out", server)))?
            .map_err(|e| {
                LapseError::LookupFailure(format!("Failed to connect to {}: {}", server, e))
            })?;

        // Send query with CRLF
        let query_bytes = format!("{}\r\n", query);
        timeout(self.timeout, stream.write_all(query_bytes.as_bytes()))
            .await
            .map_err(|_| LapseError::Timeout("Write timed out".to_string()))?
            .map_err(|e| LapseError::LookupFailure(format!("Failed to send query: {}", e)))?;

        let mut response = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            match timeout(self.timeout, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break, // EOF
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.len() > MAX_RESPONSE_SIZE {
                        return Err(LapseError::LookupFailure("Response too large".to_string()));
                    }
                }
                Ok(Err(e)) => {
                    return Err(LapseError::LookupFailure(format!("Read error: {}", e)));
                }
                Err(_) => {
                    // Some servers never close; keep what arrived
                    if !response.is_empty() {
                        break;
                    }
                    return Err(LapseError::Timeout(format!(
                        "Read from {} timed out",
                        server
                    )));
                }
            }
        }

        if response.is_empty() {
            return Err(LapseError::LookupFailure(format!(
                "Empty WHOIS response from {}",
                server
            )));
        }

        Ok(decode_response(response))
    }
}

/// UTF-8 when valid, Latin-1 otherwise.
fn decode_response(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&c| c as char).collect())
}

fn extract_referral(response: &str) -> Option<String> {
    REFERRAL_PATTERNS
        .iter()
        .filter_map(|re| re.captures(response))
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .trim()
                .trim_start_matches("whois://")
                .trim_end_matches('/')
                .to_lowercase()
        })
        .find(|server| server.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whois::testing::spawn_whois_server;

    #[test]
    fn test_extract_referral() {
        let registry = "   Registrar WHOIS Server: whois.registrar.example\r\n   Registry Expiry Date: 2024-08-13T04:00:00Z\r\n";
        assert_eq!(
            extract_referral(registry),
            Some("whois.registrar.example".to_string())
        );

        let iana = "domain:       XYZ\n\nrefer:        whois.nic.xyz\n";
        assert_eq!(extract_referral(iana), Some("whois.nic.xyz".to_string()));

        let arin = "ReferralServer:  whois://whois.ripe.net\n";
        assert_eq!(extract_referral(arin), Some("whois.ripe.net".to_string()));
    }

    #[test]
    fn test_empty_referral_is_ignored() {
        let raw = "Registrar WHOIS Server: \nRegistrar: Example\n";
        assert_eq!(extract_referral(raw), None);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let bytes = b"Registrar: Soci\xe9t\xe9\n".to_vec();
        assert_eq!(decode_response(bytes), "Registrar: Société\n");
    }

    #[tokio::test]
    async fn test_lookup_against_local_server() {
        let port = spawn_whois_server(|query| match query {
            "example.com" => Some(
                "Domain Name: EXAMPLE.COM\r\nRegistry Expiry Date: 2024-08-13T04:00:00Z\r\nRegistrar: Example Registrar\r\n"
                    .to_string(),
            ),
            _ => None,
        })
        .await;

        let client = WhoisClient::new().with_server("127.0.0.1").with_port(port);
        let record = client.lookup("https://www.Example.com/").await.unwrap();

        assert_eq!(record.domain, "example.com");
        assert_eq!(record.registrar_name(), "Example Registrar");
        assert_eq!(
            record.expiration_text.as_deref(),
            Some("2024-08-13T04:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_lookup_unregistered_domain_fails() {
        let port = spawn_whois_server(|_| None).await;

        let client = WhoisClient::new().with_server("127.0.0.1").with_port(port);
        let err = client.lookup("unregistered.com").await.unwrap_err();

        assert!(matches!(err, LapseError::LookupFailure(_)));
        assert!(err.to_string().contains("not registered"));
    }

    #[tokio::test]
    async fn test_lookup_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = WhoisClient::new()
            .with_server("127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        let err = client.lookup("example.com").await.unwrap_err();

        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_invalid_domain_is_rejected_before_io() {
        let client = WhoisClient::new().with_server("192.0.2.1");
        let err = client.lookup("not a domain").await.unwrap_err();
        assert!(matches!(err, LapseError::InvalidDomain(_)));
    }
}
