//! Run configuration assembled from the command line.

use std::path::PathBuf;
use std::time::Duration;

use crate::check::{parse_domain_file, DomainTarget, DEFAULT_QUERY_DELAY};
use crate::error::{LapseError, Result};
use crate::output::OutputFormat;

/// Threshold applied to a single `--domainname` when none is given.
pub const DEFAULT_EXPIRE_DAYS: u32 = 10_000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Where and how alert emails are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub to: String,
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: DEFAULT_SMTP_PORT,
            to: "root".to_string(),
            from: "root".to_string(),
        }
    }
}

impl SmtpConfig {
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("SMTP server", &self.server),
            ("SMTP recipient", &self.to),
            ("SMTP sender", &self.from),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((name, _)) = missing {
            return Err(LapseError::ConfigurationError(format!(
                "email notification requires an {}",
                name
            )));
        }
        // These go into SMTP command lines verbatim
        let unsafe_field = [
            ("SMTP server", &self.server),
            ("SMTP recipient", &self.to),
            ("SMTP sender", &self.from),
        ]
        .into_iter()
        .find(|(_, value)| value.chars().any(char::is_control));

        if let Some((name, value)) = unsafe_field {
            return Err(LapseError::ConfigurationError(format!(
                "{} contains control characters: {:?}",
                name, value
            )));
        }
        if self.port == 0 {
            return Err(LapseError::ConfigurationError(
                "SMTP port must be between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub domain: Option<String>,
    pub domain_file: Option<PathBuf>,
    /// Threshold for `domain`; file entries carry their own.
    pub expire_days: u32,
    pub interactive: bool,
    pub email: bool,
    pub smtp: SmtpConfig,
    pub query_delay: Duration,
    pub timeout: Duration,
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            domain: None,
            domain_file: None,
            expire_days: DEFAULT_EXPIRE_DAYS,
            interactive: false,
            email: false,
            smtp: SmtpConfig::default(),
            query_delay: DEFAULT_QUERY_DELAY,
            timeout: DEFAULT_TIMEOUT,
            format: OutputFormat::default(),
        }
    }
}

impl RunConfig {
    /// Rejects argument combinations that cannot produce a run.
    pub fn validate(&self) -> Result<()> {
        match (&self.domain, &self.domain_file) {
            (None, None) => {
                return Err(LapseError::ConfigurationError(
                    "one of --domainname or --domainfile is required".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(LapseError::ConfigurationError(
                    "--domainname and --domainfile cannot be used together".to_string(),
                ))
            }
            _ => {}
        }

        if self.timeout.is_zero() {
            return Err(LapseError::ConfigurationError(
                "timeout must be at least one second".to_string(),
            ));
        }

        if self.email {
            self.smtp.validate()?;
        }
        Ok(())
    }

    /// Reads the targets to check. A domain file is parsed in full before
    /// anything is returned.
    pub fn targets(&self) -> Result<Vec<DomainTarget>> {
        self.validate()?;

        if let Some(domain) = &self.domain {
            return Ok(vec![DomainTarget::new(domain.clone(), self.expire_days)]);
        }

        match &self.domain_file {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    LapseError::ConfigurationError(format!(
                        "cannot read domain file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                parse_domain_file(&content)
            }
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_requires_exactly_one_source() {
        let config = RunConfig::default();
        assert!(config.validate().unwrap_err().is_fatal());

        let config = RunConfig {
            domain: Some("example.com".to_string()),
            domain_file: Some(PathBuf::from("domains.txt")),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LapseError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_single_domain_uses_expire_days() {
        let config = RunConfig {
            domain: Some("example.com".to_string()),
            expire_days: 45,
            ..RunConfig::default()
        };
        assert_eq!(
            config.targets().unwrap(),
            vec![DomainTarget::new("example.com", 45)]
        );
    }

    #[test]
    fn test_email_requires_smtp_settings() {
        let config = RunConfig {
            domain: Some("example.com".to_string()),
            email: true,
            smtp: SmtpConfig {
                to: "  ".to_string(),
                ..SmtpConfig::default()
            },
            ..RunConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SMTP recipient"), "{err}");

        let config = RunConfig {
            email: false,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_smtp_addresses_reject_line_breaks() {
        let smtp = SmtpConfig {
            to: "ops@example.com>\r\nRCPT TO:<attacker@example.net".to_string(),
            ..SmtpConfig::default()
        };
        let err = smtp.validate().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("SMTP recipient"), "{err}");

        let smtp = SmtpConfig {
            from: "root\n".to_string(),
            ..SmtpConfig::default()
        };
        assert!(smtp.validate().is_err());

        assert!(SmtpConfig::default().validate().is_ok());
    }

    #[test]
    fn test_targets_from_file() {
        let path = std::env::temp_dir().join(format!("lapse-domains-{}.txt", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# owned\nexample.com 60\nexample.org 7").unwrap();
        drop(file);

        let config = RunConfig {
            domain_file: Some(path.clone()),
            ..RunConfig::default()
        };
        let targets = config.targets();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            targets.unwrap(),
            vec![
                DomainTarget::new("example.com", 60),
                DomainTarget::new("example.org", 7),
            ]
        );
    }

    #[test]
    fn test_missing_domain_file_is_fatal() {
        let config = RunConfig {
            domain_file: Some(PathBuf::from("/nonexistent/lapse/domains.txt")),
            ..RunConfig::default()
        };
        assert!(config.targets().unwrap_err().is_fatal());
    }
}
