use super::types::DomainTarget;
use crate::error::{LapseError, Result};

/// Parses a domain file: one `<domain> <threshold-days>` pair per line.
///
/// Blank lines and `#` comments are skipped. The first malformed line fails
/// the whole file so nothing is queried from a half-read configuration.
pub fn parse_domain_file(content: &str) -> Result<Vec<DomainTarget>> {
    let mut targets = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [domain, threshold] = fields.as_slice() else {
            return Err(LapseError::ConfigurationError(format!(
                "line {}: expected \"<domain> <threshold-days>\", found {:?}",
                line_no, line
            )));
        };

        let threshold_days = threshold.parse::<u32>().map_err(|_| {
            LapseError::ConfigurationError(format!(
                "line {}: threshold {:?} is not a non-negative number of days",
                line_no, threshold
            ))
        })?;

        targets.push(DomainTarget::new(*domain, threshold_days));
    }

    Ok(targets)
}
