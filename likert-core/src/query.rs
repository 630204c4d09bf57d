//! Record filtering shared by the log and chart views

use chrono::Datelike;

use crate::types::Record;

/// Conjunction of optional exact-match constraints on a record.
///
/// Date components are compared against the record's calendar `date`, so a
/// month of `3` matches `YYYY-03-DD`. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub year: Option<i32>,
    /// 1-12
    pub month: Option<u32>,
    /// 1-31
    pub day: Option<u32>,
    pub metric: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    /// True when no constraint is set
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none() && self.metric.is_none()
    }

    /// Whether `record` satisfies every set constraint
    pub fn matches(&self, record: &Record) -> bool {
        self.year.map_or(true, |y| record.date.year() == y)
            && self.month.map_or(true, |m| record.date.month() == m)
            && self.day.map_or(true, |d| record.date.day() == d)
            && self.metric.as_deref().map_or(true, |m| record.metric == m)
    }

    /// Matching records paired with their position in `records`.
    ///
    /// Positions stay valid only until the next mutation of the log.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<(usize, &'a Record)> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.matches(r))
            .collect()
    }
}
