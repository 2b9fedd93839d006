//! Domain name normalization.

use crate::error::{LapseError, Result};

/// Normalize and validate a domain name
///
/// This function:
/// - Removes http:// and https:// prefixes
/// - Removes a leading www. label
/// - Removes trailing slashes and paths
/// - Converts to lowercase
/// - Requires at least one dot and only alphanumerics, hyphens and dots
pub fn normalize_domain(domain: &str) -> Result<String> {
    let domain = domain.trim().to_lowercase();

    let domain = domain
        .strip_prefix("http://")
        .or_else(|| domain.strip_prefix("https://"))
        .unwrap_or(&domain);

    let domain = domain.split('/').next().unwrap_or(domain);
    let domain = domain.strip_prefix("www.").unwrap_or(domain);

    let invalid = || LapseError::InvalidDomain(domain.to_string());

    if domain.is_empty() || !domain.contains('.') {
        return Err(invalid());
    }

    let valid = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err(invalid());
    }

    for label in domain.split('.') {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') || label.len() > 63 {
            return Err(invalid());
        }
    }

    Ok(domain.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("example.com").unwrap(), "example.com");
        assert_eq!(normalize_domain("EXAMPLE.COM").unwrap(), "example.com");
        assert_eq!(
            normalize_domain("https://www.example.com/path").unwrap(),
            "example.com"
        );
        assert_eq!(
            normalize_domain("  WWW.EXAMPLE.CO.UK  ").unwrap(),
            "example.co.uk"
        );
    }

    #[test]
    fn test_invalid_domains() {
        for domain in [
            "",
            "nodots",
            "example..com",
            ".example.com",
            "example.com.",
            "-example.com",
            "example-.com",
            "exa mple.com",
        ] {
            assert!(
                matches!(normalize_domain(domain), Err(LapseError::InvalidDomain(_))),
                "{domain:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_overlong_label() {
        let label = "a".repeat(64);
        assert!(normalize_domain(&format!("{label}.com")).is_err());
    }
}
