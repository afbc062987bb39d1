use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use date_validator::{
    validate_date_with_clock, Clock, DateInput, DateOptions, FixedClock, Outcome, Precision,
    SystemClock, WeekStartDay,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Validate a date against before/after bounds.
///
/// Prints `true` when the value is valid, otherwise the failure message.
/// Exits 0 when valid, 1 when invalid, 2 on a configuration or I/O error.
#[derive(Parser)]
#[command(name = "datecheck", version)]
struct Cli {
    /// The value to validate. Omit to validate an absent value.
    value: Option<String>,

    /// JSON file with camelCase options. Flags override its values.
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Strict template the value must match (e.g. DD/M/YYYY).
    #[arg(long)]
    format: Option<String>,

    /// Template for boundary dates in messages.
    #[arg(long)]
    error_format: Option<String>,

    /// second, minute, hour, day, week, month or year.
    #[arg(long)]
    precision: Option<Precision>,

    #[arg(long)]
    before: Option<String>,

    #[arg(long)]
    on_or_before: Option<String>,

    #[arg(long)]
    after: Option<String>,

    #[arg(long)]
    on_or_after: Option<String>,

    /// Accept an absent or blank value.
    #[arg(long)]
    allow_blank: bool,

    /// monday or sunday.
    #[arg(long)]
    week_start: Option<WeekStartDay>,

    /// IANA zone for wall-clock times (default UTC).
    #[arg(long)]
    timezone: Option<String>,

    /// Pin "now" to an RFC 3339 instant instead of the system clock.
    #[arg(long, value_name = "INSTANT")]
    now: Option<DateTime<Utc>>,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// The options file, if any, with flags applied on top.
    fn options(&self) -> Result<DateOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read options file {}", path.display()))?;
                DateOptions::from_json(&json)
                    .with_context(|| format!("Failed to decode options file {}", path.display()))?
            }
            None => DateOptions::new(),
        };

        if self.allow_blank {
            options.allow_blank = true;
        }
        if let Some(format) = &self.format {
            options = options.format(format.as_str());
        }
        if let Some(error_format) = &self.error_format {
            options = options.error_format(error_format.as_str());
        }
        if let Some(precision) = self.precision {
            options = options.precision(precision);
        }
        if let Some(bound) = &self.before {
            options = options.before(bound.as_str());
        }
        if let Some(bound) = &self.on_or_before {
            options = options.on_or_before(bound.as_str());
        }
        if let Some(bound) = &self.after {
            options = options.after(bound.as_str());
        }
        if let Some(bound) = &self.on_or_after {
            options = options.on_or_after(bound.as_str());
        }
        if let Some(week_start) = self.week_start {
            options = options.week_start(week_start);
        }
        if let Some(timezone) = &self.timezone {
            options = options.timezone(timezone.as_str());
        }

        Ok(options)
    }

    fn run(&self) -> Result<Outcome> {
        let options = self.options()?;
        tracing::debug!(?options, "merged options");

        let clock: Box<dyn Clock> = match self.now {
            Some(instant) => Box::new(FixedClock::new(instant)),
            None => Box::new(SystemClock),
        };
        let value = DateInput::from(self.value.clone());

        validate_date_with_clock(&mut (), value, &options, clock.as_ref())
            .context("Invalid validator configuration")
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let outcome = match cli.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    };

    if cli.json {
        match serde_json::to_string(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        println!("{outcome}");
    }

    if outcome.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
