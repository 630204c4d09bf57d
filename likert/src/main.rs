//! likert - personal metric tracker
//!
//! Record observations of self-defined metrics and chart their trends over
//! time from the terminal.

mod commands;
mod process_lock;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use likert_core::{Config, Database, RecordFilter, Tracker};

use crate::process_lock::{acquire_store_guard, StoreGuard};

#[derive(Parser)]
#[command(name = "likert")]
#[command(about = "Track personal metrics over time")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available measurement scales
    Scales,

    /// Manage metric definitions
    Metric {
        #[command(subcommand)]
        action: MetricCommand,
    },

    /// Record an observation
    Record {
        /// Metric name
        metric: String,

        /// Observed value (defaults to the scale's midpoint)
        value: Option<String>,

        /// Calendar day, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Hour of day, 0-23 (defaults to the current hour)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        hour: Option<u32>,
    },

    /// Show recorded observations with their positions
    Log {
        #[command(flatten)]
        filter: FilterArgs,

        /// Only show this metric
        #[arg(short, long)]
        metric: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Delete the record at a position shown by `likert log`
    Delete {
        index: usize,
    },

    /// Delete every record (metrics are kept)
    Clear {
        /// Skip a confirmation prompt; give twice to skip both
        #[arg(short, long, action = ArgAction::Count)]
        yes: u8,
    },

    /// Show a metric's averages per period
    Chart {
        /// Metric to chart (defaults to the most recorded one)
        #[arg(short, long)]
        metric: Option<String>,

        /// hour, day, week, month or year
        #[arg(short, long)]
        period: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write all records as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge records from a CSV file
    Import {
        file: PathBuf,
    },

    /// Show storage locations and totals
    Info,
}

#[derive(Subcommand)]
enum MetricCommand {
    /// Define a new metric
    Add {
        name: String,

        /// likert, binary or continuous
        #[arg(short, long, default_value = "likert")]
        scale: String,
    },

    /// Remove a metric and all of its records
    Rm {
        name: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List metrics with their record counts
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Date filters shared by `log` and `chart`
#[derive(Args, Clone, Default)]
struct FilterArgs {
    #[arg(long)]
    year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    day: Option<u32>,
}

impl FilterArgs {
    fn to_filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::new();
        if let Some(year) = self.year {
            filter = filter.year(year);
        }
        if let Some(month) = self.month {
            filter = filter.month(month);
        }
        if let Some(day) = self.day {
            filter = filter.day(day);
        }
        filter
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<likert_core::Error>() {
            Some(core) if core.is_user_error() => {
                eprintln!("error: {}", core);
                ExitCode::from(2)
            }
            _ => {
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, stdout is for command output)
    let _log_guard =
        likert_core::logging::init(&config.logging).context("failed to initialize logging")?;

    if let Command::Scales = cli.command {
        commands::scales();
        return Ok(());
    }

    let (_store_guard, mut tracker) = open_tracker(&config)?;

    match cli.command {
        Command::Scales => unreachable!("handled before the store is opened"),
        Command::Metric { action } => match action {
            MetricCommand::Add { name, scale } => commands::metric_add(&mut tracker, &name, &scale),
            MetricCommand::Rm { name, yes } => commands::metric_rm(&mut tracker, &name, yes),
            MetricCommand::List { format } => commands::metric_list(&tracker, format),
        },
        Command::Record {
            metric,
            value,
            date,
            hour,
        } => commands::record(&mut tracker, &metric, value.as_deref(), date.as_deref(), hour),
        Command::Log {
            filter,
            metric,
            format,
        } => {
            let mut filter = filter.to_filter();
            if let Some(metric) = metric {
                filter = filter.metric(metric);
            }
            commands::log(&tracker, &filter, format)
        }
        Command::Delete { index } => commands::delete(&mut tracker, index),
        Command::Clear { yes } => commands::clear(&mut tracker, yes),
        Command::Chart {
            metric,
            period,
            filter,
            format,
        } => {
            let period = match period {
                Some(p) => p.parse()?,
                None => config.chart.default_period,
            };
            commands::chart(&tracker, metric, &filter.to_filter(), period, format)
        }
        Command::Export { output } => commands::export(&tracker, output.as_deref()),
        Command::Import { file } => commands::import(&mut tracker, &file),
        Command::Info => commands::info(&tracker),
    }
}

/// Lock the store for this process, then load the snapshot.
fn open_tracker(config: &Config) -> Result<(StoreGuard, Tracker)> {
    let db_path = Config::database_path();
    let guard = acquire_store_guard(&db_path).context("failed to acquire process lock")?;

    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let tracker =
        Tracker::open(db, config.store.snapshot_key.as_str()).context("failed to load snapshot")?;
    Ok((guard, tracker))
}
