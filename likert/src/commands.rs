//! Command handlers
//!
//! Each handler takes the already-opened tracker and prints to stdout.
//! Input that the core would accept but a recording form would never
//! produce (values off the scale) is rejected here.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Timelike};
use likert_core::format::{format_average, format_bound, format_scale, format_time_of_day};
use likert_core::{
    build_series, format_timestamp, parse_date, ChartSeries, Error, Period, RecordFilter,
    ScaleKind, Tracker,
};
use serde::Serialize;

use crate::OutputFormat;

const BAR_WIDTH: f64 = 40.0;

pub fn scales() {
    for kind in ScaleKind::builtins() {
        let def = kind.resolve();
        println!(
            "{:<12} {:<20} {}..{} step {} (default {})",
            kind.as_str(),
            kind.label(),
            format_bound(def.min),
            format_bound(def.max),
            format_bound(def.step),
            format_bound(def.default)
        );
    }
}

pub fn metric_add(tracker: &mut Tracker, name: &str, scale: &str) -> Result<()> {
    let scale = ScaleKind::parse(scale.trim());
    if !scale.is_builtin() {
        return Err(Error::Validation(format!(
            "Unknown scale: {} (expected likert, binary or continuous)",
            scale
        ))
        .into());
    }

    let metric = tracker.add_metric(name, scale)?;
    println!("Added {} ({})", metric.name, metric.scale.label());
    Ok(())
}

pub fn metric_rm(tracker: &mut Tracker, name: &str, yes: bool) -> Result<()> {
    if tracker.snapshot().find_metric(name).is_none() {
        println!("No metric named {}", name);
        return Ok(());
    }

    let count = tracker.snapshot().usage_count(name);
    if !yes && !confirm(&format!("Delete {} and its {} record(s)?", name, count))? {
        println!("Cancelled");
        return Ok(());
    }

    if let Some(removed) = tracker.remove_metric(name)? {
        println!("Removed {} and {} record(s)", name, removed);
    }
    Ok(())
}

pub fn metric_list(tracker: &Tracker, format: OutputFormat) -> Result<()> {
    let usage = tracker.snapshot().usage();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&usage)?);
        return Ok(());
    }

    if usage.is_empty() {
        println!("No metrics yet. Add one with `likert metric add <name>`.");
        return Ok(());
    }
    for entry in usage {
        println!(
            "{:<20} {:<20} {}",
            entry.name,
            entry.scale.label(),
            entry.count
        );
    }
    Ok(())
}

pub fn record(
    tracker: &mut Tracker,
    metric: &str,
    value: Option<&str>,
    date: Option<&str>,
    hour: Option<u32>,
) -> Result<()> {
    let now = Local::now();
    let date = match date {
        Some(text) => parse_date(text)
            .ok_or_else(|| Error::Validation(format!("Invalid date: {} (use YYYY-MM-DD)", text)))?,
        None => now.date_naive(),
    };
    let hour = hour.unwrap_or_else(|| now.hour());

    // Without a scale to check against, the core reports the missing metric.
    let scale = tracker.snapshot().scale_of(metric).cloned();
    let value = match (value, &scale) {
        (Some(text), Some(scale)) => {
            check_on_scale(scale, text)?;
            text.trim().to_string()
        }
        (Some(text), None) => text.trim().to_string(),
        (None, scale) => format_bound(scale.clone().unwrap_or_default().resolve().default),
    };

    let record = tracker.record_observation(metric, &value, date, hour)?;
    println!(
        "Recorded {} = {} on {} at {}",
        record.metric,
        record.value,
        record.date,
        format_time_of_day(&record.timestamp)
    );
    Ok(())
}

/// Accept only values a slider over `scale` could produce.
fn check_on_scale(scale: &ScaleKind, text: &str) -> Result<()> {
    let def = scale.resolve();
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("Value must be a number, got {}", text)))?;

    let on_step = def.steps().iter().any(|s| (s - value).abs() < 1e-9);
    if !def.contains(value) || !on_step {
        return Err(Error::Validation(format!(
            "{} is not on the {} scale ({}..{} step {})",
            text,
            scale.label(),
            format_bound(def.min),
            format_bound(def.max),
            format_bound(def.step)
        ))
        .into());
    }
    Ok(())
}

#[derive(Serialize)]
struct LogRow<'a> {
    index: usize,
    metric: &'a str,
    value: &'a str,
    date: NaiveDate,
    timestamp: String,
    scale: Option<&'a ScaleKind>,
}

pub fn log(tracker: &Tracker, filter: &RecordFilter, format: OutputFormat) -> Result<()> {
    let snapshot = tracker.snapshot();
    let rows = filter.apply(&snapshot.records);

    if format == OutputFormat::Json {
        let rows: Vec<LogRow> = rows
            .iter()
            .map(|(index, r)| LogRow {
                index: *index,
                metric: &r.metric,
                value: &r.value,
                date: r.date,
                timestamp: format_timestamp(&r.timestamp),
                scale: snapshot.scale_of(&r.metric),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        if filter.is_empty() {
            println!("No records yet.");
        } else {
            println!("No records match.");
        }
        return Ok(());
    }
    for (index, r) in rows {
        println!(
            "{:>5}  {} {}  {:<20} {:<8} {}",
            index,
            r.date,
            format_time_of_day(&r.timestamp),
            r.metric,
            r.value,
            format_scale(snapshot.scale_of(&r.metric))
        );
    }
    Ok(())
}

pub fn delete(tracker: &mut Tracker, index: usize) -> Result<()> {
    let record = tracker.remove_record_at(index)?;
    println!(
        "Deleted {} = {} on {}",
        record.metric, record.value, record.date
    );
    Ok(())
}

pub fn clear(tracker: &mut Tracker, yes: u8) -> Result<()> {
    let count = tracker.snapshot().records.len();
    if count == 0 {
        println!("No records to clear.");
        return Ok(());
    }

    let questions = [
        format!("Delete all {} records?", count),
        "This cannot be undone. Are you sure?".to_string(),
    ];
    for question in questions.iter().skip(usize::from(yes)) {
        if !confirm(question)? {
            println!("Cancelled");
            return Ok(());
        }
    }

    let removed = tracker.clear_records()?;
    println!("Cleared {} record(s)", removed);
    Ok(())
}

pub fn chart(
    tracker: &Tracker,
    metric: Option<String>,
    filter: &RecordFilter,
    period: Period,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = tracker.snapshot();
    let Some(metric) = metric.or_else(|| snapshot.default_chart_metric()) else {
        println!("No metrics yet. Add one with `likert metric add <name>`.");
        return Ok(());
    };

    let series = build_series(snapshot, &metric, filter, period);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    match series {
        Some(series) => print_series(&series),
        None => println!("No data for {}.", metric),
    }
    Ok(())
}

fn print_series(series: &ChartSeries) {
    let axis = series.axis;
    println!(
        "{}  [{}..{}]",
        series.label,
        format_bound(axis.min),
        format_bound(axis.max)
    );

    let span = axis.max - axis.min;
    for point in &series.points {
        let filled = if span > 0.0 {
            (((point.average - axis.min) / span).clamp(0.0, 1.0) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        println!(
            "{:<16} {:>7}  {:<width$}  n={}",
            point.period_key,
            format_average(point.average),
            "#".repeat(filled),
            point.count,
            width = BAR_WIDTH as usize
        );
    }
}

pub fn export(tracker: &Tracker, output: Option<&Path>) -> Result<()> {
    let csv = tracker.export_csv();

    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Exported {} record(s) to {}",
                tracker.snapshot().records.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(csv.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub fn import(tracker: &mut Tracker, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let summary = tracker.import_csv(&text)?;
    println!(
        "Imported {} record(s): {} duplicate(s), {} skipped, {} new metric(s)",
        summary.imported, summary.duplicates, summary.skipped, summary.metrics_created
    );
    for rejected in &summary.rejected {
        eprintln!("  {}", rejected);
    }
    Ok(())
}

pub fn info(tracker: &Tracker) -> Result<()> {
    let snapshot = tracker.snapshot();
    let size = tracker
        .database()
        .get_database_size()
        .context("failed to read database size")?;

    println!("Database: {}", likert_core::Config::database_path().display());
    println!("Log file: {}", likert_core::logging::log_file_path().display());
    println!("Snapshot key: {}", tracker.key());
    println!("Size: {} bytes", size);
    println!("Metrics: {}", snapshot.metrics.len());
    println!("Records: {}", snapshot.records.len());
    Ok(())
}

/// Ask a yes/no question on stdin. Anything but y/yes is a no.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
