//! Analytics module for likert
//!
//! Turns the raw observation log into chartable trends:
//! - [`aggregate`]: calendar bucketing (hour/day/week/month/year) with mean and count
//! - [`chart`]: per-metric series with axis bounds taken from the metric's scale

pub mod aggregate;
pub mod chart;

pub use aggregate::{aggregate, aggregate_in, Period, PeriodBucket};
pub use chart::{build_series, ChartSeries};
