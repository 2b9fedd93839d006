mod checker;
mod domain_file;
mod types;

pub use checker::{evaluate, today, ExpirationChecker, ProgressCallback, DEFAULT_QUERY_DELAY};
pub use domain_file::parse_domain_file;
pub use types::{CheckResult, DomainRecord, DomainTarget, ExpirationStatus};
