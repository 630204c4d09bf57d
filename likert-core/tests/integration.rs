//! Integration tests for the tracker on an on-disk store
//!
//! These tests open a real SQLite file in a temp directory, reopen it between
//! steps, and check what a second process would see.

use chrono::NaiveDate;
use likert_core::db::Database;
use likert_core::{build_series, Period, RecordFilter, ScaleKind, Tracker};
use std::path::PathBuf;
use tempfile::TempDir;

const KEY: &str = "likert_data";

fn open(path: &PathBuf) -> Tracker {
    let db = Database::open(path).expect("failed to open database");
    db.migrate().expect("failed to migrate database");
    Tracker::open(db, KEY).expect("failed to load snapshot")
}

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

// ============================================
// Persistence
// ============================================

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/data.db");

    {
        let mut tracker = open(&path);
        tracker.add_metric("mood", ScaleKind::Likert).unwrap();
        tracker.add_metric("sleep", ScaleKind::Continuous).unwrap();
        tracker
            .record_observation("mood", "4", date("2024-01-01"), 9)
            .unwrap();
        tracker
            .record_observation("sleep", "80", date("2024-01-01"), 7)
            .unwrap();
        tracker.remove_record_at(0).unwrap();
    }

    let tracker = open(&path);
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.metrics.len(), 2);
    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.records[0].metric, "sleep");
    assert_eq!(snapshot.records[0].hour(), 7);
}

#[test]
fn test_legacy_document_is_upgraded_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");

    {
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        db.put(
            KEY,
            r#"{"metrics":["sleep","mood"],"records":[{"metric":"mood","value":"3","date":"2024-01-01","timestamp":"2024-01-01T09:00:00.000Z"}]}"#,
        )
        .unwrap();
    }

    let first = open(&path);
    let upgraded = first.database().get(KEY).unwrap().unwrap();
    drop(first);

    let second = open(&path);
    assert_eq!(second.database().get(KEY).unwrap().unwrap(), upgraded);
    assert_eq!(second.snapshot().metrics.len(), 2);
    assert!(second
        .snapshot()
        .metrics
        .iter()
        .all(|m| m.scale == ScaleKind::Likert));
    assert_eq!(second.snapshot().usage_count("mood"), 1);
}

#[test]
fn test_unknown_scale_survives_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");

    {
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        db.put(
            KEY,
            r#"{"metrics":[{"name":"pain","scale":"nrs-11"}],"records":[]}"#,
        )
        .unwrap();
    }

    let mut tracker = open(&path);
    let pain = tracker.snapshot().find_metric("pain").unwrap().clone();
    assert_eq!(pain.scale, ScaleKind::Custom("nrs-11".to_string()));
    assert_eq!(pain.scale.resolve().max, 5.0);

    tracker.add_metric("mood", ScaleKind::Likert).unwrap();
    let stored = tracker.database().get(KEY).unwrap().unwrap();
    assert!(stored.contains(r#""scale":"nrs-11""#));
}

// ============================================
// CSV transfer
// ============================================

#[test]
fn test_export_import_between_stores() {
    let dir = TempDir::new().unwrap();

    let mut source = open(&dir.path().join("source.db"));
    source.add_metric("energy", ScaleKind::Continuous).unwrap();
    for (day, hour, value) in [("2024-01-01", 9, "40"), ("2024-01-01", 18, "60"), ("2024-01-08", 9, "90")] {
        source
            .record_observation("energy", value, date(day), hour)
            .unwrap();
    }
    let csv = source.export_csv();

    let target_path = dir.path().join("target.db");
    {
        let mut target = open(&target_path);
        let summary = target.import_csv(&csv).unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.metrics_created, 1);
    }

    let target = open(&target_path);
    assert_eq!(target.snapshot(), source.snapshot());

    let series = build_series(target.snapshot(), "energy", &RecordFilter::new(), Period::Week)
        .expect("series");
    let keys: Vec<&str> = series.points.iter().map(|p| p.period_key.as_str()).collect();
    assert_eq!(keys, vec!["2023-12-31", "2024-01-07"]);
    assert_eq!(series.points[0].average, 50.0);
}

#[test]
fn test_legacy_csv_merges_into_existing_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");

    let mut tracker = open(&path);
    tracker.add_metric("mood", ScaleKind::Binary).unwrap();

    let csv = "metric,value,date,timestamp\n\
               mood,1,2024-02-01,2024-02-01T08:00:00.000Z\n\
               focus,4,2024-02-01,2024-02-01T10:00:00.000Z\n";
    let summary = tracker.import_csv(csv).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.metrics_created, 1);
    drop(tracker);

    let tracker = open(&path);
    // Existing metrics keep their scale; new ones default to likert
    assert_eq!(tracker.snapshot().scale_of("mood"), Some(&ScaleKind::Binary));
    assert_eq!(tracker.snapshot().scale_of("focus"), Some(&ScaleKind::Likert));
}
