use colored::Colorize;

use super::OutputFormatter;
use crate::check::CheckResult;
use crate::colors::CatppuccinExt;

const DOMAIN_WIDTH: usize = 25;
const REGISTRAR_WIDTH: usize = 20;
const EXPIRATION_WIDTH: usize = 30;

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.sky().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_white().to_string()
        } else {
            text.to_string()
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.use_colors {
            text.overlay1().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn rule(&self, width: usize) -> String {
        if self.use_colors {
            "─".repeat(width).subtext0().to_string()
        } else {
            "-".repeat(width)
        }
    }

    fn days_left(&self, days: i64, alert: bool) -> String {
        let text = days.to_string();
        if days < 0 {
            self.error(&text)
        } else if alert {
            self.warning(&text)
        } else {
            self.success(&text)
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_header(&self) -> String {
        let heading = format!(
            "{}  {}  {}  {}",
            pad("Domain Name", DOMAIN_WIDTH),
            pad("Registrar", REGISTRAR_WIDTH),
            pad("Expiration Date", EXPIRATION_WIDTH),
            "Days Left"
        );
        let width = heading.chars().count();
        format!("{}\n{}", self.label(&heading), self.rule(width))
    }

    fn format_result(&self, result: &CheckResult) -> String {
        let domain = pad(&result.target.domain, DOMAIN_WIDTH);

        match &result.status {
            Some(status) => {
                let expiration = status.record.expiration.format("%Y-%m-%d").to_string();
                let domain = if status.alert {
                    self.warning(&domain)
                } else {
                    self.value(&domain)
                };
                format!(
                    "{}  {}  {}  {}",
                    domain,
                    self.value(&pad(&status.record.registrar, REGISTRAR_WIDTH)),
                    self.value(&pad(&expiration, EXPIRATION_WIDTH)),
                    self.days_left(status.days_remaining, status.alert)
                )
            }
            None => {
                let reason = result.error.as_deref().unwrap_or("check failed");
                format!(
                    "{}  {}  {}",
                    self.value(&domain),
                    self.muted(&pad("-", REGISTRAR_WIDTH)),
                    self.error(reason)
                )
            }
        }
    }

    fn format_summary(&self, results: &[CheckResult]) -> String {
        let failed = results.iter().filter(|r| !r.success).count();
        let alerting = results.iter().filter(|r| r.is_alert()).count();

        let alerting_text = format!("{} alerting", alerting);
        let failed_text = format!("{} failed", failed);
        format!(
            "{} checked, {}, {}",
            results.len(),
            if alerting > 0 {
                self.warning(&alerting_text)
            } else {
                self.value(&alerting_text)
            },
            if failed > 0 {
                self.error(&failed_text)
            } else {
                self.value(&failed_text)
            },
        )
    }

    fn format_batch(&self, results: &[CheckResult]) -> String {
        let mut output = vec![self.format_header()];
        output.extend(results.iter().map(|r| self.format_result(r)));
        output.push(String::new());
        output.push(self.format_summary(results));
        output.join("\n")
    }
}
