//! The tracker: a snapshot bound to its storage key
//!
//! Every mutation validates against the in-memory snapshot first, then
//! rewrites the whole document under the key. A rejected call touches
//! neither memory nor storage.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::csv::{export_csv, parse_csv};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::scale::ScaleKind;
use crate::store::{observation_instant, parse_snapshot, ImportOutcome, Migration, Snapshot};
use crate::types::{Metric, Record};

/// Counts from one CSV import.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub metrics_created: usize,
    /// Why each skipped line was rejected, in file order
    pub rejected: Vec<Error>,
}

pub struct Tracker {
    db: Database,
    key: String,
    snapshot: Snapshot,
}

impl Tracker {
    /// Load the snapshot stored under `key`, upgrading legacy documents.
    ///
    /// A missing key starts an empty tracker. A document that cannot be
    /// parsed is copied to `<key>.corrupt` and replaced by an empty one. A
    /// document with some unreadable entries is copied there as well, and
    /// the readable entries are kept and saved.
    pub fn open(db: Database, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let stored = db.get(&key)?;

        let mut tracker = Self {
            db,
            key,
            snapshot: Snapshot::new(),
        };

        let Some(text) = stored else {
            tracing::info!(key = %tracker.key, "No stored snapshot, starting empty");
            return Ok(tracker);
        };

        match parse_snapshot(&text) {
            Ok(loaded) => {
                tracker.snapshot = loaded.snapshot;
                if !loaded.dropped.is_empty() {
                    let backup = tracker.backup_key();
                    tracing::warn!(
                        key = %tracker.key,
                        backup = %backup,
                        dropped = loaded.dropped.len(),
                        "Stored snapshot has unreadable entries, keeping the rest"
                    );
                    tracker.db.put(&backup, &text)?;
                    tracker.save()?;
                } else if let Migration::Upgraded { metrics } = loaded.migration {
                    tracing::info!(key = %tracker.key, metrics, "Persisting migrated snapshot");
                    tracker.save()?;
                }
                tracing::debug!(
                    metrics = tracker.snapshot.metrics.len(),
                    records = tracker.snapshot.records.len(),
                    "Snapshot loaded"
                );
            }
            Err(Error::Json(e)) => {
                let backup = tracker.backup_key();
                tracing::warn!(
                    key = %tracker.key,
                    backup = %backup,
                    error = %e,
                    "Stored snapshot is unreadable, starting empty"
                );
                tracker.db.put(&backup, &text)?;
                tracker.save()?;
            }
            Err(e) => return Err(e),
        }

        Ok(tracker)
    }

    fn backup_key(&self) -> String {
        format!("{}.corrupt", self.key)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Give the storage handle back, e.g. to reopen it.
    pub fn into_database(self) -> Database {
        self.db
    }

    pub fn add_metric(&mut self, name: &str, scale: ScaleKind) -> Result<Metric> {
        let metric = self.snapshot.add_metric(name, scale)?.clone();
        self.save()?;
        tracing::info!(metric = %metric.name, scale = %metric.scale, "Metric added");
        Ok(metric)
    }

    /// Remove a metric and all of its records.
    ///
    /// Returns the number of records removed, or `None` (and saves nothing)
    /// when no metric has that name.
    pub fn remove_metric(&mut self, name: &str) -> Result<Option<usize>> {
        let Some(removed) = self.snapshot.remove_metric(name) else {
            return Ok(None);
        };
        self.save()?;
        tracing::info!(metric = name, records = removed, "Metric removed");
        Ok(Some(removed))
    }

    pub fn append_record(
        &mut self,
        metric: &str,
        value: &str,
        date: NaiveDate,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<Record> {
        let record = self
            .snapshot
            .append_record(metric, value, date, timestamp)?
            .clone();
        self.save()?;
        tracing::debug!(metric, value, %date, "Record appended");
        Ok(record)
    }

    /// Append an observation entered as a date and an hour of that day.
    pub fn record_observation(
        &mut self,
        metric: &str,
        value: &str,
        date: NaiveDate,
        hour: u32,
    ) -> Result<Record> {
        let timestamp = observation_instant(date, hour)?;
        self.append_record(metric, value, date, timestamp)
    }

    pub fn remove_record_at(&mut self, index: usize) -> Result<Record> {
        let record = self.snapshot.remove_record_at(index)?;
        self.save()?;
        tracing::info!(index, metric = %record.metric, "Record removed");
        Ok(record)
    }

    /// Remove every record, keeping metrics. Returns how many were removed.
    pub fn clear_records(&mut self) -> Result<usize> {
        let removed = self.snapshot.clear_records();
        if removed > 0 {
            self.save()?;
        }
        tracing::info!(records = removed, "Records cleared");
        Ok(removed)
    }

    /// Merge a CSV file in either layout. Saves once at the end.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportSummary> {
        let parsed = parse_csv(text)?;

        let mut summary = ImportSummary {
            skipped: parsed.rejected.len(),
            rejected: parsed.rejected,
            ..Default::default()
        };

        for row in parsed.rows {
            match self.snapshot.import_row(row) {
                ImportOutcome::Imported { metric_created } => {
                    summary.imported += 1;
                    if metric_created {
                        summary.metrics_created += 1;
                    }
                }
                ImportOutcome::Duplicate => summary.duplicates += 1,
            }
        }

        if summary.imported > 0 {
            self.save()?;
        }

        if summary.skipped > 0 {
            tracing::warn!(skipped = summary.skipped, "Import skipped malformed lines");
        }
        tracing::info!(
            format = ?parsed.format,
            imported = summary.imported,
            duplicates = summary.duplicates,
            metrics_created = summary.metrics_created,
            "CSV import finished"
        );

        Ok(summary)
    }

    pub fn export_csv(&self) -> String {
        export_csv(&self.snapshot)
    }

    fn save(&self) -> Result<()> {
        let text = serde_json::to_string(&self.snapshot)?;
        self.db.put(&self.key, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    const KEY: &str = "likert_data";

    fn empty_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn reopen(tracker: Tracker) -> Tracker {
        Tracker::open(tracker.into_database(), KEY).unwrap()
    }

    fn day(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_open_missing_key_is_empty_and_unsaved() {
        let tracker = Tracker::open(empty_db(), KEY).unwrap();
        assert!(tracker.snapshot().is_empty());
        assert!(tracker.database().get(KEY).unwrap().is_none());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let mut tracker = Tracker::open(empty_db(), KEY).unwrap();
        tracker.add_metric("mood", ScaleKind::Likert).unwrap();
        tracker
            .record_observation("mood", "4", day("2024-01-01"), 9)
            .unwrap();

        let tracker = reopen(tracker);
        assert_eq!(tracker.snapshot().metrics.len(), 1);
        assert_eq!(tracker.snapshot().records.len(), 1);
        assert_eq!(tracker.snapshot().records[0].hour(), 9);
    }

    #[test]
    fn test_rejected_mutation_leaves_storage_alone() {
        let mut tracker = Tracker::open(empty_db(), KEY).unwrap();
        let ts = parse_timestamp("2024-01-01T09:00:00Z").unwrap();

        let err = tracker
            .append_record("mood", "4", ts.date_naive(), ts)
            .unwrap_err();
        assert!(err.is_user_error());
        assert!(tracker.database().get(KEY).unwrap().is_none());

        tracker.add_metric("mood", ScaleKind::Likert).unwrap();
        let before = tracker.database().get(KEY).unwrap();
        assert!(tracker.add_metric("mood", ScaleKind::Binary).is_err());
        assert!(matches!(
            tracker.remove_record_at(0),
            Err(Error::Index { index: 0, len: 0 })
        ));
        assert_eq!(tracker.database().get(KEY).unwrap(), before);
    }

    #[test]
    fn test_open_upgrades_legacy_document() {
        let db = empty_db();
        db.put(
            KEY,
            r#"{"metrics":["sleep","mood"],"records":[{"metric":"mood","value":"3","date":"2024-01-01","timestamp":"2024-01-01T09:00:00.000Z"}]}"#,
        )
        .unwrap();

        let tracker = Tracker::open(db, KEY).unwrap();
        assert_eq!(tracker.snapshot().metrics[1], Metric::new("mood", ScaleKind::Likert));

        let stored = tracker.database().get(KEY).unwrap().unwrap();
        let doc: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(doc["metrics"][0]["scale"], "likert");
    }

    #[test]
    fn test_open_backs_up_corrupt_document() {
        crate::logging::init_test();
        let db = empty_db();
        db.put(KEY, "{not json").unwrap();

        let tracker = Tracker::open(db, KEY).unwrap();
        assert!(tracker.snapshot().is_empty());
        assert_eq!(
            tracker.database().get("likert_data.corrupt").unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_open_keeps_readable_entries_of_damaged_document() {
        crate::logging::init_test();
        let db = empty_db();
        let stored = r#"{"metrics":["mood","sleep"],"records":[{"metric":"mood","value":"4","date":"2024-01-01","timestamp":"2024-01-01T09:00:00.000Z"},{"metric":"sleep","value":"3","date":"2024-01-01"}]}"#;
        db.put(KEY, stored).unwrap();

        let tracker = Tracker::open(db, KEY).unwrap();
        assert_eq!(tracker.snapshot().metrics.len(), 2);
        assert_eq!(tracker.snapshot().records.len(), 1);
        assert_eq!(
            tracker.database().get("likert_data.corrupt").unwrap().as_deref(),
            Some(stored)
        );

        // The cleaned document was saved, so a second open drops nothing
        let saved = tracker.database().get(KEY).unwrap().unwrap();
        assert!(!saved.contains(r#""metric":"sleep""#));
        let tracker = reopen(tracker);
        assert_eq!(tracker.snapshot().records.len(), 1);
        assert_eq!(tracker.snapshot().scale_of("sleep"), Some(&ScaleKind::Likert));
    }

    #[test]
    fn test_remove_metric_cascades_and_unknown_is_noop() {
        let mut tracker = Tracker::open(empty_db(), KEY).unwrap();
        tracker.add_metric("mood", ScaleKind::Likert).unwrap();
        tracker.add_metric("sleep", ScaleKind::Continuous).unwrap();
        tracker
            .record_observation("mood", "4", day("2024-01-01"), 9)
            .unwrap();
        tracker
            .record_observation("sleep", "70", day("2024-01-01"), 7)
            .unwrap();

        assert_eq!(tracker.remove_metric("ghost").unwrap(), None);
        assert_eq!(tracker.remove_metric("mood").unwrap(), Some(1));

        let tracker = reopen(tracker);
        assert_eq!(tracker.snapshot().records.len(), 1);
        assert_eq!(tracker.snapshot().records[0].metric, "sleep");
    }

    #[test]
    fn test_clear_keeps_metrics() {
        let mut tracker = Tracker::open(empty_db(), KEY).unwrap();
        tracker.add_metric("mood", ScaleKind::Likert).unwrap();
        tracker
            .record_observation("mood", "4", day("2024-01-01"), 9)
            .unwrap();

        assert_eq!(tracker.clear_records().unwrap(), 1);
        let tracker = reopen(tracker);
        assert!(tracker.snapshot().records.is_empty());
        assert_eq!(tracker.snapshot().metrics.len(), 1);
    }

    #[test]
    fn test_import_counts_and_dedups() {
        let mut tracker = Tracker::open(empty_db(), KEY).unwrap();
        let csv = "\
metric,scale,value,date,timestamp
mood,likert,4,2024-01-01,2024-01-01T09:00:00.000Z
mood,likert,5,2024-01-01,2024-01-01T09:00:00.000Z
energy,continuous,55,2024-01-01,2024-01-01T10:00:00.000Z
broken,row
";
        let summary = tracker.import_csv(csv).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.metrics_created, 2);

        let again = tracker.import_csv(csv).unwrap();
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates, 3);
        assert_eq!(tracker.snapshot().records.len(), 2);
    }

    #[test]
    fn test_import_unknown_header_changes_nothing() {
        let mut tracker = Tracker::open(empty_db(), KEY).unwrap();
        assert!(matches!(
            tracker.import_csv("a,b,c\n1,2,3\n"),
            Err(Error::ImportFormat { .. })
        ));
        assert!(tracker.database().get(KEY).unwrap().is_none());
    }

    #[test]
    fn test_export_then_import_into_empty_tracker() {
        let mut source = Tracker::open(empty_db(), KEY).unwrap();
        source.add_metric("mood", ScaleKind::Likert).unwrap();
        source.add_metric("walked", ScaleKind::Binary).unwrap();
        source
            .record_observation("mood", "4", day("2024-01-01"), 9)
            .unwrap();
        source
            .record_observation("walked", "1", day("2024-01-02"), 18)
            .unwrap();

        let mut target = Tracker::open(empty_db(), KEY).unwrap();
        let summary = target.import_csv(&source.export_csv()).unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(target.snapshot(), source.snapshot());
    }
}
