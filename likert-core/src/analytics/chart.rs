//! Chart series for a single metric

use serde::Serialize;

use super::aggregate::{aggregate, Period, PeriodBucket};
use crate::query::RecordFilter;
use crate::scale::{ScaleDefinition, ScaleKind};
use crate::store::Snapshot;

/// Everything a renderer needs to draw one metric's trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub metric: String,
    /// e.g. "mood (daily average)"
    pub label: String,
    pub period: Period,
    /// `None` when the metric is no longer defined
    pub scale: Option<ScaleKind>,
    /// Y axis domain (Likert when the scale is unknown)
    pub axis: ScaleDefinition,
    pub points: Vec<PeriodBucket>,
}

impl ChartSeries {
    /// Total records behind the series
    pub fn record_count(&self) -> usize {
        self.points.iter().map(|p| p.count).sum()
    }
}

/// Build the series for `metric`, narrowed by the date parts of `filter`.
///
/// Any metric constraint on `filter` is replaced by `metric`. Returns `None`
/// when no record survives filtering.
pub fn build_series(
    snapshot: &Snapshot,
    metric: &str,
    filter: &RecordFilter,
    period: Period,
) -> Option<ChartSeries> {
    let filter = filter.clone().metric(metric);
    let rows = filter.apply(&snapshot.records);
    if rows.is_empty() {
        return None;
    }

    let points = aggregate(rows.iter().map(|(_, r)| *r), period);
    if points.is_empty() {
        return None;
    }

    let scale = snapshot.scale_of(metric).cloned();
    let axis = scale.clone().unwrap_or_default().resolve();

    Some(ChartSeries {
        metric: metric.to_string(),
        label: format!("{} ({} average)", metric, period.adjective()),
        period,
        scale,
        axis,
        points,
    })
}
