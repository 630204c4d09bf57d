//! CSV export and import
//!
//! Two layouts exist. Files are always written in the current one; either
//! is accepted on import, chosen by the header line.
//!
//! ```text
//! metric,scale,value,date,timestamp     current
//! metric,value,date,timestamp           legacy (scale is likert)
//! ```
//!
//! Fields are separated by bare commas with no quoting, so metric names and
//! values must not contain commas.

use crate::error::{Error, Result};
use crate::scale::ScaleKind;
use crate::store::{ImportRow, Snapshot};
use crate::types::{format_timestamp, parse_date, parse_timestamp};

const CURRENT_HEADER: &str = "metric,scale,value,date,timestamp";
const LEGACY_HEADER: &str = "metric,value,date,timestamp";

/// Column layout of an import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvFormat {
    /// `metric,scale,value,date,timestamp`
    Current,
    /// `metric,value,date,timestamp`
    Legacy,
}

impl CsvFormat {
    /// Identify the layout from a header line.
    pub fn detect(header: &str) -> Option<Self> {
        let header = header.trim_start_matches('\u{feff}').trim();
        if header == CURRENT_HEADER {
            Some(CsvFormat::Current)
        } else if header == LEGACY_HEADER {
            Some(CsvFormat::Legacy)
        } else {
            None
        }
    }

    fn columns(&self) -> usize {
        match self {
            CsvFormat::Current => 5,
            CsvFormat::Legacy => 4,
        }
    }

    /// Parse one data line. `line` is 1-based and only used for errors.
    fn parse_row(&self, line: usize, text: &str) -> Result<ImportRow> {
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        if fields.len() != self.columns() {
            return Err(Error::ImportFormat {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    self.columns(),
                    fields.len()
                ),
            });
        }

        let (metric, scale, value, date, timestamp) = match self {
            CsvFormat::Current => (
                fields[0],
                ScaleKind::parse(fields[1]),
                fields[2],
                fields[3],
                fields[4],
            ),
            CsvFormat::Legacy => (fields[0], ScaleKind::Likert, fields[1], fields[2], fields[3]),
        };

        if metric.is_empty() {
            return Err(Error::ImportFormat {
                line,
                message: "metric name is empty".to_string(),
            });
        }
        let date = parse_date(date).ok_or_else(|| Error::ImportFormat {
            line,
            message: format!("invalid date: {}", date),
        })?;
        let timestamp = parse_timestamp(timestamp).ok_or_else(|| Error::ImportFormat {
            line,
            message: format!("invalid timestamp: {}", timestamp),
        })?;

        Ok(ImportRow {
            metric: metric.to_string(),
            scale,
            value: value.to_string(),
            date,
            timestamp,
        })
    }
}

/// Rows read from an import file, plus the lines that were rejected.
#[derive(Debug)]
pub struct ParsedCsv {
    pub format: CsvFormat,
    pub rows: Vec<ImportRow>,
    /// One [`Error::ImportFormat`] per skipped line
    pub rejected: Vec<Error>,
}

/// Parse an import file.
///
/// Fails only when the header is missing or unrecognized. Bad data lines are
/// collected in [`ParsedCsv::rejected`] and parsing continues.
pub fn parse_csv(text: &str) -> Result<ParsedCsv> {
    let mut lines = text.lines().enumerate();

    let (header_index, header) = lines
        .by_ref()
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or_else(|| Error::ImportFormat {
            line: 1,
            message: "file is empty".to_string(),
        })?;
    let format = CsvFormat::detect(header).ok_or_else(|| Error::ImportFormat {
        line: header_index + 1,
        message: format!("unrecognized header: {}", header.trim()),
    })?;

    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    for (i, text) in lines {
        if text.trim().is_empty() {
            continue;
        }
        match format.parse_row(i + 1, text) {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping import line");
                rejected.push(e);
            }
        }
    }

    Ok(ParsedCsv {
        format,
        rows,
        rejected,
    })
}

/// Render every record in the current layout.
///
/// Records whose metric is gone are written with the Likert scale.
pub fn export_csv(snapshot: &Snapshot) -> String {
    let mut out = String::with_capacity(64 * (snapshot.records.len() + 1));
    out.push_str(CURRENT_HEADER);
    out.push('\n');

    for record in &snapshot.records {
        let scale = snapshot
            .scale_of(&record.metric)
            .cloned()
            .unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            record.metric,
            scale,
            record.value,
            record.date,
            format_timestamp(&record.timestamp)
        ));
    }

    out
}
