//! Snapshot document migrations
//!
//! Early versions stored metrics as bare names:
//!
//! ```json
//! { "metrics": ["sleep", "mood"], "records": [...] }
//! ```
//!
//! Current documents store `{ "name", "scale" }` objects. The shape is told
//! apart by the first element of `metrics` only; an empty metric list is
//! already current.
//!
//! Loading is per entry: a metric or record that cannot be read is dropped
//! and reported, and the rest of the document still loads. Only a document
//! whose top level is not an object with list sections is rejected.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::Snapshot;
use crate::error::{Error, Result};
use crate::scale::ScaleKind;

/// Layout of a stored snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotShape {
    /// `metrics` holds bare strings
    Legacy,
    /// `metrics` holds objects, or is empty
    Current,
}

impl SnapshotShape {
    /// Classify a parsed document.
    pub fn of(doc: &Value) -> Self {
        match doc.get("metrics").and_then(|m| m.get(0)) {
            Some(Value::String(_)) => SnapshotShape::Legacy,
            _ => SnapshotShape::Current,
        }
    }
}

/// Result of running [`migrate_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// Document was already current
    Unchanged,
    /// Legacy metrics were upgraded
    Upgraded { metrics: usize },
}

/// Upgrade a document in place. Running it again is a no-op.
pub fn migrate_document(doc: &mut Value) -> Result<Migration> {
    if SnapshotShape::of(doc) == SnapshotShape::Current {
        return Ok(Migration::Unchanged);
    }

    let Some(Value::Array(metrics)) = doc.get_mut("metrics") else {
        return Ok(Migration::Unchanged);
    };

    let upgraded = metrics
        .iter()
        .enumerate()
        .map(|(i, m)| match m {
            Value::String(name) => Ok(json!({
                "name": name,
                "scale": ScaleKind::Likert.as_str(),
            })),
            other => Err(malformed(format!(
                "legacy metric {} is not a name: {}",
                i, other
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let count = upgraded.len();
    *metrics = upgraded;

    tracing::info!(metrics = count, "Migrated legacy metric names");
    Ok(Migration::Upgraded { metrics: count })
}

/// A snapshot read from storage, with what loading had to change.
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub migration: Migration,
    /// Entries that could not be read, as they were stored
    pub dropped: Vec<Value>,
}

/// Parse stored text into a snapshot, migrating legacy documents.
///
/// Unreadable metric or record entries end up in
/// [`LoadedSnapshot::dropped`]. Errors only when the text is not JSON, is
/// not an object, or has a section that is not a list.
pub fn parse_snapshot(text: &str) -> Result<LoadedSnapshot> {
    let mut doc: Value = serde_json::from_str(text)?;
    if !doc.is_object() {
        return Err(malformed("snapshot is not a JSON object".to_string()));
    }

    let migration = migrate_document(&mut doc)?;

    let mut dropped = Vec::new();
    let metrics = take_entries(&mut doc, "metrics", &mut dropped)?;
    let records = take_entries(&mut doc, "records", &mut dropped)?;

    Ok(LoadedSnapshot {
        snapshot: Snapshot { metrics, records },
        migration,
        dropped,
    })
}

/// Read each entry of the list under `section`, setting aside bad ones.
fn take_entries<T: DeserializeOwned>(
    doc: &mut Value,
    section: &str,
    dropped: &mut Vec<Value>,
) -> Result<Vec<T>> {
    let entries = match doc.get_mut(section).map(Value::take) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(malformed(format!("{} is not a list: {}", section, other)));
        }
    };

    let mut kept = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match T::deserialize(&entry) {
            Ok(item) => kept.push(item),
            Err(e) => {
                tracing::warn!(section, index, error = %e, "Dropping unreadable entry");
                dropped.push(entry);
            }
        }
    }
    Ok(kept)
}

fn malformed(message: String) -> Error {
    Error::Json(<serde_json::Error as serde::de::Error>::custom(message))
}
