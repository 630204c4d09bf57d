//! Metric definitions

use serde::Serialize;

use super::Snapshot;
use crate::error::{Error, Result};
use crate::scale::ScaleKind;
use crate::types::Metric;

/// A metric together with how many records reference it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricUsage {
    pub name: String,
    pub scale: ScaleKind,
    pub count: usize,
}

impl Snapshot {
    /// Define a new metric.
    ///
    /// The name is trimmed before it is checked and stored. Fails if it is
    /// blank or an existing metric already has exactly that name.
    pub fn add_metric(&mut self, name: &str, scale: ScaleKind) -> Result<&Metric> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Metric name cannot be blank."));
        }
        if self.find_metric(name).is_some() {
            return Err(Error::validation(format!("Metric already exists: {}", name)));
        }

        self.metrics.push(Metric::new(name, scale));
        Ok(&self.metrics[self.metrics.len() - 1])
    }

    /// Delete a metric and every record that references it.
    ///
    /// Returns the number of records removed, or `None` if no metric has
    /// that name (nothing is changed in that case).
    pub fn remove_metric(&mut self, name: &str) -> Option<usize> {
        let position = self.metrics.iter().position(|m| m.name == name)?;
        self.metrics.remove(position);

        let before = self.records.len();
        self.records.retain(|r| r.metric != name);
        Some(before - self.records.len())
    }

    /// Look up a metric by exact name
    pub fn find_metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Scale of the named metric, or `None` when the metric is not defined.
    pub fn scale_of(&self, name: &str) -> Option<&ScaleKind> {
        self.find_metric(name).map(|m| &m.scale)
    }

    /// Number of records referencing `name`
    pub fn usage_count(&self, name: &str) -> usize {
        self.records.iter().filter(|r| r.metric == name).count()
    }

    /// Every metric with its record count, most used first.
    ///
    /// Ties keep metric definition order.
    pub fn usage(&self) -> Vec<MetricUsage> {
        let mut usage: Vec<MetricUsage> = self
            .metrics
            .iter()
            .map(|m| MetricUsage {
                name: m.name.clone(),
                scale: m.scale.clone(),
                count: self.usage_count(&m.name),
            })
            .collect();

        // Stable sort keeps definition order among equal counts
        usage.sort_by(|a, b| b.count.cmp(&a.count));
        usage
    }

    /// Metric to chart when the user has not picked one: the most used.
    pub fn default_chart_metric(&self) -> Option<String> {
        self.usage().into_iter().next().map(|u| u.name)
    }
}
