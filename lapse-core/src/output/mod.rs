mod human;
mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use serde::{Deserialize, Serialize};

use crate::check::CheckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" | "table" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub trait OutputFormatter {
    /// Printed once before any result; empty when the format has none.
    fn format_header(&self) -> String {
        String::new()
    }

    fn format_result(&self, result: &CheckResult) -> String;

    /// Printed once after the last result; empty when the format has none.
    fn format_summary(&self, _results: &[CheckResult]) -> String {
        String::new()
    }

    fn format_batch(&self, results: &[CheckResult]) -> String;
}

pub fn get_formatter(format: OutputFormat, use_colors: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Human if use_colors => Box::new(HumanFormatter::new()),
        OutputFormat::Human => Box::new(HumanFormatter::new().without_colors()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
