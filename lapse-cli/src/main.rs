mod display;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use lapse_core::colors::CatppuccinExt;
use lapse_core::config::{DEFAULT_EXPIRE_DAYS, DEFAULT_SMTP_PORT};
use lapse_core::output::{get_formatter, HumanFormatter, OutputFormat, OutputFormatter};
use lapse_core::{
    CheckResult, EmailNotifier, ExpirationChecker, Notification, ProgressCallback, RunConfig,
    SmtpConfig, WhoisClient,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use display::{eprint_line, print_line, ProgressWriterFactory, Spinner};

#[derive(Parser)]
#[command(name = "lapse")]
#[command(about = "Check domain registrations against expiry thresholds and send alerts")]
#[command(version)]
struct Cli {
    /// Domain to check
    #[arg(long = "domainname", env = "LAPSE_DOMAIN")]
    domain: Option<String>,

    /// File with one "<domain> <threshold-days>" pair per line
    #[arg(long = "domainfile", env = "LAPSE_DOMAIN_FILE")]
    domain_file: Option<PathBuf>,

    /// Alert threshold in days for --domainname
    #[arg(long = "expiredays", env = "LAPSE_EXPIRE_DAYS", default_value_t = DEFAULT_EXPIRE_DAYS)]
    expire_days: u32,

    /// Print a table of results
    #[arg(long)]
    interactive: bool,

    /// Email an alert for every domain inside its threshold
    #[arg(long)]
    email: bool,

    /// Seconds to wait between WHOIS queries
    #[arg(long = "sleeptime", env = "LAPSE_SLEEP_TIME", default_value_t = 60)]
    sleep_time: u64,

    /// Network timeout in seconds for WHOIS and SMTP
    #[arg(long, env = "LAPSE_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    #[arg(long = "smtpserver", env = "LAPSE_SMTP_SERVER", default_value = "localhost")]
    smtp_server: String,

    #[arg(long = "smtpport", env = "LAPSE_SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    smtp_port: u16,

    /// Recipient of alert emails
    #[arg(long = "smtpto", env = "LAPSE_SMTP_TO", default_value = "root")]
    smtp_to: String,

    /// Sender of alert emails
    #[arg(long = "smtpfrom", env = "LAPSE_SMTP_FROM", default_value = "root")]
    smtp_from: String,

    /// Output format (human or json)
    #[arg(short, long, env = "LAPSE_FORMAT", default_value = "human")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            domain: self.domain,
            domain_file: self.domain_file,
            expire_days: self.expire_days,
            interactive: self.interactive,
            email: self.email,
            smtp: SmtpConfig {
                server: self.smtp_server,
                port: self.smtp_port,
                to: self.smtp_to,
                from: self.smtp_from,
            },
            query_delay: Duration::from_secs(self.sleep_time),
            timeout: Duration::from_secs(self.timeout),
            format: self.format,
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ProgressWriterFactory)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // colored already honours NO_COLOR
    let use_colors = !cli.no_color;
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.into_config();

    match run(&config, use_colors).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".ctp_red(), e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every domain was checked and every alert delivered.
async fn run(config: &RunConfig, use_colors: bool) -> anyhow::Result<bool> {
    let targets = config.targets()?;
    if targets.is_empty() {
        eprintln!("{} No domains to check", "Warning:".ctp_yellow());
        return Ok(true);
    }

    let checker = ExpirationChecker::new()
        .with_client(WhoisClient::new().with_timeout(config.timeout))
        .with_delay(config.query_delay);

    let table = config.interactive && config.format == OutputFormat::Human;
    let formatter = get_formatter(config.format, use_colors);

    // Alerts go out as each domain is checked, not at the end of the batch
    let notifier = config
        .email
        .then(|| EmailNotifier::new(config.smtp.clone()).with_timeout(config.timeout));
    let delivered = AtomicBool::new(true);
    let on_result = {
        let notifier = notifier.as_ref();
        let delivered = &delivered;
        let to = config.smtp.to.as_str();
        move |result: CheckResult| async move {
            if let Some(notifier) = notifier {
                if !send_alert(notifier, &result, to).await {
                    delivered.store(false, Ordering::Relaxed);
                }
            }
            result
        }
    };

    let results = if table {
        print_line(&formatter.format_header());

        let spinner = Arc::new(Spinner::new(&format!("Checking {} domain(s)", targets.len())));
        let status_line = Arc::clone(&spinner);
        let rows = if use_colors {
            HumanFormatter::new()
        } else {
            HumanFormatter::new().without_colors()
        };
        let progress: ProgressCallback =
            Box::new(move |done: usize, total: usize, result: &CheckResult| {
                print_line(&rows.format_result(result));
                status_line.set_message(format!("Checked {}/{}", done, total));
                if done < total {
                    debug!(done, total, "Waiting before next WHOIS query");
                }
            });

        let results = checker.run_with(targets, Some(progress), on_result).await;
        drop(spinner);
        print_line("");
        print_line(&formatter.format_summary(&results));
        results
    } else {
        checker.run_with(targets, None, on_result).await
    };

    if config.format == OutputFormat::Json {
        println!("{}", formatter.format_batch(&results));
    }

    let all_ok = results.iter().all(|r| r.success);
    Ok(all_ok && delivered.load(Ordering::Relaxed))
}

/// Emails an alert when `result` is inside its threshold. Returns false only
/// when delivery failed.
async fn send_alert(notifier: &EmailNotifier, result: &CheckResult, to: &str) -> bool {
    let Some(status) = result.status.as_ref().filter(|s| s.alert) else {
        return true;
    };

    let notification = Notification::from(status);
    match notifier.send(&notification).await {
        Ok(()) => {
            info!(domain = %notification.domain, to = %to, "Alert sent");
            true
        }
        Err(e) => {
            eprint_line(&format!(
                "{} {}: {}",
                "Error:".ctp_red(),
                notification.domain,
                e
            ));
            false
        }
    }
}
