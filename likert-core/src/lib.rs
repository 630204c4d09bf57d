//! # likert-core
//!
//! Core library for likert - a personal time-series metric tracker.
//!
//! This library provides:
//! - Metric definitions on a small set of measurement scales
//! - An append-only observation log with filtering
//! - Calendar aggregation for charting (hour/day/week/month/year)
//! - CSV import and export
//! - Snapshot persistence in SQLite, with upgrades of older documents
//! - Configuration and logging infrastructure
//!
//! ## Architecture
//!
//! All state lives in one [`Snapshot`] (metrics plus records). A [`Tracker`]
//! owns the snapshot and the [`Database`] it is stored in, and rewrites the
//! whole document after every mutation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use likert_core::{Config, Database, ScaleKind, Tracker};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let mut tracker = Tracker::open(db, config.store.snapshot_key).expect("failed to load");
//! tracker.add_metric("mood", ScaleKind::Likert).expect("failed to add metric");
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{aggregate, aggregate_in, build_series, ChartSeries, Period, PeriodBucket};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use query::RecordFilter;
pub use scale::{ScaleDefinition, ScaleKind};
pub use store::{MetricUsage, Snapshot};
pub use tracker::{ImportSummary, Tracker};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod csv;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod query;
pub mod scale;
pub mod store;
pub mod tracker;
pub mod types;
