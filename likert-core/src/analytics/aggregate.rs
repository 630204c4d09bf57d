//! Period bucketing and averaging
//!
//! Records are grouped into calendar periods and each group is reduced to its
//! arithmetic mean and size. Hours are read from the timestamp on the local
//! clock. Days and coarser periods come from the record's calendar `date`.
//!
//! | period | bucket time | period key |
//! |--------|-------------|------------|
//! | hour   | local timestamp truncated to the hour | record date, local `HH:00` |
//! | day    | record date, midnight | `YYYY-MM-DD` |
//! | week   | Sunday on/before the date, midnight | that Sunday, `YYYY-MM-DD` |
//! | month  | first of the month, midnight | `YYYY-MM` |
//! | year   | January 1, midnight | `YYYY` |

use std::collections::HashMap;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Record;

/// Calendar granularity for bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    /// All periods, finest first
    pub const ALL: [Period; 5] = [
        Period::Hour,
        Period::Day,
        Period::Week,
        Period::Month,
        Period::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Hour => "hour",
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Adjective used in series labels ("daily average")
    pub fn adjective(&self) -> &'static str {
        match self {
            Period::Hour => "hourly",
            Period::Day => "daily",
            Period::Week => "weekly",
            Period::Month => "monthly",
            Period::Year => "yearly",
        }
    }

    /// Bucket key and bucket start time for a record, on the local clock.
    pub fn bucket(&self, record: &Record) -> (String, NaiveDateTime) {
        self.bucket_in(record, &Local)
    }

    /// Bucket key and bucket start time for a record, reading hours in `tz`.
    pub fn bucket_in<Tz: TimeZone>(&self, record: &Record, tz: &Tz) -> (String, NaiveDateTime) {
        let date = record.date;
        match self {
            Period::Hour => {
                let wall = record.wall_time(tz);
                let hour = wall.hour();
                (
                    format!("{} {:02}:00", date, hour),
                    midnight(wall.date()) + Duration::hours(i64::from(hour)),
                )
            }
            Period::Day => (date.to_string(), midnight(date)),
            Period::Week => {
                let sunday = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
                (sunday.to_string(), midnight(sunday))
            }
            Period::Month => {
                let first = date - Duration::days(i64::from(date.day0()));
                (date.format("%Y-%m").to_string(), midnight(first))
            }
            Period::Year => {
                let first = date - Duration::days(i64::from(date.ordinal0()));
                (date.format("%Y").to_string(), midnight(first))
            }
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hour" => Ok(Period::Hour),
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(Error::validation(format!(
                "unknown period: {} (expected hour, day, week, month or year)",
                s
            ))),
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Mean and size of one period's records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    pub period_key: String,
    pub bucket_time: NaiveDateTime,
    pub average: f64,
    pub count: usize,
}

#[derive(Default)]
struct Accumulator {
    bucket_time: Option<NaiveDateTime>,
    sum: f64,
    count: usize,
}

/// Group `records` by `period` and average each group.
///
/// Output is ordered by bucket time regardless of input order. Records whose
/// value is not numeric are left out.
pub fn aggregate<'a, I>(records: I, period: Period) -> Vec<PeriodBucket>
where
    I: IntoIterator<Item = &'a Record>,
{
    aggregate_in(records, period, &Local)
}

/// [`aggregate`] with hourly buckets read in `tz` instead of the local zone.
pub fn aggregate_in<'a, I, Tz>(records: I, period: Period, tz: &Tz) -> Vec<PeriodBucket>
where
    I: IntoIterator<Item = &'a Record>,
    Tz: TimeZone,
{
    let mut groups: HashMap<String, Accumulator> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(value) = record.numeric_value() else {
            skipped += 1;
            continue;
        };

        let (key, bucket_time) = period.bucket_in(record, tz);
        let acc = groups.entry(key).or_default();
        acc.bucket_time = Some(acc.bucket_time.map_or(bucket_time, |t| t.min(bucket_time)));
        acc.sum += value;
        acc.count += 1;
    }

    if skipped > 0 {
        tracing::warn!(skipped, period = %period, "Ignored records with non-numeric values");
    }

    let mut buckets: Vec<PeriodBucket> = groups
        .into_iter()
        .filter_map(|(period_key, acc)| {
            let bucket_time = acc.bucket_time?;
            Some(PeriodBucket {
                period_key,
                bucket_time,
                average: acc.sum / acc.count as f64,
                count: acc.count,
            })
        })
        .collect();

    buckets.sort_by(|a, b| {
        a.bucket_time
            .cmp(&b.bucket_time)
            .then_with(|| a.period_key.cmp(&b.period_key))
    });
    buckets
}
