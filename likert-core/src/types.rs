//! Core domain types for likert
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Metric** | A named quantity being tracked, with a measurement scale |
//! | **Record** | One timestamped observation of a metric's value |
//! | **Scale** | Numeric domain and step size for a metric's values (see [`crate::scale`]) |
//! | **Snapshot** | Metrics and records persisted together as one document |
//!
//! A record refers to its metric by name only. Deleting a metric cascades
//! to its records, but a record whose metric is missing for any other reason
//! (hand-edited data, partial imports) is still valid and renders with an
//! unknown scale.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::scale::ScaleKind;

// ============================================
// Metric
// ============================================

/// A tracked quantity. Names are unique within a snapshot (exact match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub scale: ScaleKind,
}

impl Metric {
    pub fn new(name: impl Into<String>, scale: ScaleKind) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }
}

// ============================================
// Record
// ============================================

/// One observation of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Name of the metric observed (soft reference)
    pub metric: String,
    /// Observed value, kept as entered so imported text round-trips
    pub value: String,
    /// Calendar day the observation belongs to
    pub date: NaiveDate,
    /// Full instant of the observation
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<FixedOffset>,
}

impl Record {
    pub fn new(
        metric: impl Into<String>,
        value: impl Into<String>,
        date: NaiveDate,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
            date,
            timestamp,
        }
    }

    /// Value as a number, or `None` if the stored text is not numeric.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Wall-clock time of the observation in `tz`.
    pub fn wall_time<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDateTime {
        self.timestamp.with_timezone(tz).naive_local()
    }

    /// Hour of day (0-23) on the local clock.
    pub fn hour(&self) -> u32 {
        self.wall_time(&Local).hour()
    }

    /// `(metric, timestamp)` pair used to detect duplicate imports.
    pub fn identity(&self) -> (&str, DateTime<FixedOffset>) {
        (&self.metric, self.timestamp)
    }
}

/// Format a timestamp the way it is persisted and exported.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO 8601 / RFC 3339 timestamp with an explicit offset.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text.trim()).ok()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

mod iso8601 {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_timestamp(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", text)))
    }
}
