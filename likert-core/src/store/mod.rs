//! In-memory snapshot of all tracked data
//!
//! [`Snapshot`] holds the metric definitions and the observation log. Its
//! operations are pure in-memory mutations that either succeed completely or
//! leave the snapshot untouched; persisting the result is the job of
//! [`crate::Tracker`].
//!
//! - [`metrics`]: metric definitions, usage counts, cascade delete
//! - [`records`]: observation log, positional delete, import rows
//! - [`migrate`]: legacy snapshot upgrade

pub mod metrics;
pub mod migrate;
pub mod records;

use serde::{Deserialize, Serialize};

use crate::types::{Metric, Record};

pub use metrics::MetricUsage;
pub use migrate::{migrate_document, parse_snapshot, LoadedSnapshot, Migration, SnapshotShape};
pub use records::{observation_instant, ImportOutcome, ImportRow};

/// All metrics and records, persisted as a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the snapshot holds no metrics and no records
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.records.is_empty()
    }
}
