//! Observation log

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};

use super::Snapshot;
use crate::error::{Error, Result};
use crate::scale::ScaleKind;
use crate::types::{Metric, Record};

/// One parsed row of an import file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub metric: String,
    /// Scale to create the metric with if it does not exist yet
    pub scale: ScaleKind,
    pub value: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<FixedOffset>,
}

/// What happened to an import row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Row appended; `metric_created` is set when its metric was new
    Imported { metric_created: bool },
    /// A record with the same metric and timestamp already exists
    Duplicate,
}

impl Snapshot {
    /// Append an observation of an existing metric.
    ///
    /// The value is stored as given; range checks belong to whatever
    /// collected it.
    pub fn append_record(
        &mut self,
        metric: &str,
        value: &str,
        date: NaiveDate,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<&Record> {
        if self.metrics.is_empty() {
            return Err(Error::validation("Create a metric first."));
        }
        if metric.is_empty() {
            return Err(Error::validation("Select a metric."));
        }
        if self.find_metric(metric).is_none() {
            return Err(Error::validation(format!("Unknown metric: {}", metric)));
        }

        self.records.push(Record::new(metric, value, date, timestamp));
        Ok(&self.records[self.records.len() - 1])
    }

    /// Remove the record at `index`, shifting later records down by one.
    pub fn remove_record_at(&mut self, index: usize) -> Result<Record> {
        if index >= self.records.len() {
            return Err(Error::Index {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Remove every record. Metrics are kept. Returns how many were removed.
    pub fn clear_records(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }

    /// Merge one imported row.
    ///
    /// Creates the metric on first sight. A row is a duplicate when a record
    /// with the same metric and timestamp exists, whatever its value.
    pub fn import_row(&mut self, row: ImportRow) -> ImportOutcome {
        let duplicate = self
            .records
            .iter()
            .any(|r| r.identity() == (row.metric.as_str(), row.timestamp));
        if duplicate {
            return ImportOutcome::Duplicate;
        }

        let metric_created = self.find_metric(&row.metric).is_none();
        if metric_created {
            self.metrics.push(Metric::new(row.metric.clone(), row.scale));
        }

        self.records
            .push(Record::new(row.metric, row.value, row.date, row.timestamp));
        ImportOutcome::Imported { metric_created }
    }
}

/// Timestamp for an observation entered as a calendar date plus an hour of
/// the day, in local wall-clock time.
pub fn observation_instant(date: NaiveDate, hour: u32) -> Result<DateTime<FixedOffset>> {
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| Error::validation(format!("Hour must be 0-23, got {}", hour)))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| Error::validation(format!("{} does not exist in local time", naive)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn ts(text: &str) -> DateTime<FixedOffset> {
        parse_timestamp(text).unwrap()
    }

    fn snapshot_with_mood() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.add_metric("mood", ScaleKind::Likert).unwrap();
        snapshot
    }

    fn import_row(metric: &str, value: &str, timestamp: &str) -> ImportRow {
        let timestamp = ts(timestamp);
        ImportRow {
            metric: metric.to_string(),
            scale: ScaleKind::Binary,
            value: value.to_string(),
            date: timestamp.date_naive(),
            timestamp,
        }
    }

    #[test]
    fn test_append_requires_metrics() {
        let mut snapshot = Snapshot::new();
        let err = snapshot
            .append_record("mood", "3", date("2024-01-01"), ts("2024-01-01T09:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(snapshot.records.is_empty());
    }

    #[test]
    fn test_append_requires_selected_metric() {
        let mut snapshot = snapshot_with_mood();
        assert!(snapshot
            .append_record("", "3", date("2024-01-01"), ts("2024-01-01T09:00:00Z"))
            .is_err());
        assert!(snapshot
            .append_record("sleep", "3", date("2024-01-01"), ts("2024-01-01T09:00:00Z"))
            .is_err());
        assert!(snapshot.records.is_empty());
    }

    #[test]
    fn test_append_stores_value_verbatim() {
        let mut snapshot = snapshot_with_mood();
        // Out of the Likert range: accepted, the collecting boundary enforces bounds
        snapshot
            .append_record("mood", "42", date("2024-01-01"), ts("2024-01-01T09:00:00Z"))
            .unwrap();
        assert_eq!(snapshot.records[0].value, "42");
    }

    #[test]
    fn test_remove_record_at_shifts_indices() {
        let mut snapshot = snapshot_with_mood();
        for (i, stamp) in ["2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z"]
            .iter()
            .enumerate()
        {
            snapshot
                .append_record("mood", &i.to_string(), date("2024-01-01"), ts(stamp))
                .unwrap();
        }

        let removed = snapshot.remove_record_at(1).unwrap();
        assert_eq!(removed.value, "1");
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[1].value, "2");

        let err = snapshot.remove_record_at(2).unwrap_err();
        assert!(matches!(err, Error::Index { index: 2, len: 2 }));
        assert_eq!(snapshot.records.len(), 2);
    }

    #[test]
    fn test_clear_records_keeps_metrics() {
        let mut snapshot = snapshot_with_mood();
        snapshot
            .append_record("mood", "3", date("2024-01-01"), ts("2024-01-01T09:00:00Z"))
            .unwrap();
        assert_eq!(snapshot.clear_records(), 1);
        assert!(snapshot.records.is_empty());
        assert_eq!(snapshot.metrics.len(), 1);
    }

    #[test]
    fn test_import_row_creates_metric_with_supplied_scale() {
        let mut snapshot = snapshot_with_mood();
        let outcome = snapshot.import_row(import_row("exercised", "1", "2024-01-01T09:00:00Z"));

        assert_eq!(outcome, ImportOutcome::Imported { metric_created: true });
        assert_eq!(snapshot.scale_of("exercised"), Some(&ScaleKind::Binary));
        assert_eq!(snapshot.records.len(), 1);
    }

    #[test]
    fn test_import_row_dedups_on_metric_and_timestamp() {
        let mut snapshot = snapshot_with_mood();
        snapshot.import_row(import_row("mood", "3", "2024-01-01T09:00:00Z"));

        // Same identity, different value: dropped
        let outcome = snapshot.import_row(import_row("mood", "5", "2024-01-01T09:00:00.000Z"));
        assert_eq!(outcome, ImportOutcome::Duplicate);
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].value, "3");

        // Same timestamp, other metric: kept
        let outcome = snapshot.import_row(import_row("sleep", "5", "2024-01-01T09:00:00Z"));
        assert_eq!(outcome, ImportOutcome::Imported { metric_created: true });
        assert_eq!(snapshot.records.len(), 2);
    }

    #[test]
    fn test_observation_instant_keeps_local_hour() {
        let instant = observation_instant(date("2024-06-15"), 14).unwrap();
        assert_eq!(instant.naive_local(), date("2024-06-15").and_hms_opt(14, 0, 0).unwrap());

        assert!(matches!(
            observation_instant(date("2024-06-15"), 24),
            Err(Error::Validation(_))
        ));
    }
}
