//! Categorical breakdowns of mean ride counts
//!
//! A breakdown groups rows by one or two [`GroupKey`]s and reports the mean
//! `total_rides` of every observed key combination, in long form. All the
//! dashboard's categorical charts are variants of the same computation, so
//! they are modelled as a closed set of [`BreakdownKind`]s dispatched through
//! [`breakdown`].
//!
//! # Examples
//!
//! ```
//! use bikestat::breakdown::{BreakdownSpec, breakdown};
//! use bikestat::grouping::{GroupKey, KeyValue};
//! use bikestat::table::{Granularity, RideRecord, RideTable};
//! use bikestat::types::{RideCounts, Weekday};
//! use chrono::NaiveDate;
//!
//! let table = RideTable::from_records(
//!     Granularity::Day,
//!     vec![
//!         RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 2).unwrap(), RideCounts::new(150, 50)),
//!         RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), RideCounts::new(80, 20)),
//!     ],
//! );
//!
//! let rows = breakdown(&table, BreakdownSpec::new(GroupKey::Weekday)).unwrap();
//! assert_eq!(rows[0].primary, KeyValue::Weekday(Weekday::Sunday));
//! assert_eq!(rows[0].mean_total_rides, 100.0);
//! ```

use crate::aggregation_types::CategoryAggregate;
use crate::error::{BikestatError, Result};
use crate::filters::calendar_consistent;
use crate::grouping::{GroupKey, KeyValue};
use crate::table::{Granularity, RideTable};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Grouping keys of a breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownSpec {
    /// Key the output is ordered by first
    pub primary: GroupKey,
    /// Optional second key, producing long-form rows
    pub secondary: Option<GroupKey>,
}

impl BreakdownSpec {
    /// Single-key breakdown
    pub fn new(primary: GroupKey) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Add a secondary key
    pub fn with_secondary(mut self, secondary: GroupKey) -> Self {
        self.secondary = Some(secondary);
        self
    }

    fn validate(&self, table: &RideTable) -> Result<()> {
        if self.secondary == Some(self.primary) {
            return Err(BikestatError::InvalidArgument(format!(
                "primary and secondary keys are both '{}'",
                self.primary
            )));
        }
        table.require_column(self.primary.column())?;
        if let Some(secondary) = self.secondary {
            table.require_column(secondary.column())?;
        }
        Ok(())
    }
}

/// Sum and row count behind one mean
#[derive(Default)]
struct MeanAccumulator {
    sum: u64,
    count: usize,
}

impl MeanAccumulator {
    fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }
}

/// Mean `total_rides` per observed key combination
///
/// Output is ordered by the primary key's canonical order, then by the
/// secondary key. Combinations with no rows are absent, and rows lacking a
/// value for any key are ignored. Fails with `MissingColumn` when a key's
/// column is absent from the table.
pub fn breakdown(table: &RideTable, spec: BreakdownSpec) -> Result<Vec<CategoryAggregate>> {
    spec.validate(table)?;

    let mut groups: BTreeMap<(KeyValue, Option<KeyValue>), MeanAccumulator> = BTreeMap::new();

    for record in table.records() {
        let Some(primary) = spec.primary.extract(record) else {
            continue;
        };
        let secondary = match spec.secondary {
            Some(key) => match key.extract(record) {
                Some(value) => Some(value),
                None => continue,
            },
            None => None,
        };

        let acc = groups.entry((primary, secondary)).or_default();
        acc.sum += record.rides.total;
        acc.count += 1;
    }

    debug!(
        "Breakdown by {}{} produced {} groups from {} rows",
        spec.primary,
        spec.secondary
            .map(|s| format!(" x {s}"))
            .unwrap_or_default(),
        groups.len(),
        table.len()
    );

    Ok(groups
        .into_iter()
        .map(|((primary, secondary), acc)| CategoryAggregate {
            primary,
            secondary,
            mean_total_rides: acc.mean(),
            observations: acc.count,
        })
        .collect())
}

/// Mean rides per hour of day, split by weather condition
pub fn hourly_weather_breakdown(table: &RideTable) -> Result<Vec<CategoryAggregate>> {
    breakdown(
        table,
        BreakdownSpec::new(GroupKey::Hour).with_secondary(GroupKey::Weather),
    )
}

/// The dashboard's categorical charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BreakdownKind {
    /// Weekday × weather condition, day table
    WeekdayByWeather,
    /// Hour of day × weather condition, hour table
    HourByWeather,
    /// Working day vs weekend, day table
    WorkingDay,
    /// Weekday × working day on calendar-consistent rows, day table
    WeekdayByWorkingDay,
    /// Season × working day, day table
    SeasonByWorkingDay,
}

impl BreakdownKind {
    pub const ALL: [BreakdownKind; 5] = [
        BreakdownKind::WeekdayByWeather,
        BreakdownKind::HourByWeather,
        BreakdownKind::WorkingDay,
        BreakdownKind::WeekdayByWorkingDay,
        BreakdownKind::SeasonByWorkingDay,
    ];

    pub fn spec(&self) -> BreakdownSpec {
        match self {
            Self::WeekdayByWeather => {
                BreakdownSpec::new(GroupKey::Weekday).with_secondary(GroupKey::Weather)
            }
            Self::HourByWeather => {
                BreakdownSpec::new(GroupKey::Hour).with_secondary(GroupKey::Weather)
            }
            Self::WorkingDay => BreakdownSpec::new(GroupKey::WorkingDay),
            Self::WeekdayByWorkingDay => {
                BreakdownSpec::new(GroupKey::Weekday).with_secondary(GroupKey::WorkingDay)
            }
            Self::SeasonByWorkingDay => {
                BreakdownSpec::new(GroupKey::Season).with_secondary(GroupKey::WorkingDay)
            }
        }
    }

    /// Which table the breakdown reads
    pub fn source(&self) -> Granularity {
        match self {
            Self::HourByWeather => Granularity::Hour,
            _ => Granularity::Day,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WeekdayByWeather => "weekday-by-weather",
            Self::HourByWeather => "hour-by-weather",
            Self::WorkingDay => "working-day",
            Self::WeekdayByWorkingDay => "weekday-by-working-day",
            Self::SeasonByWorkingDay => "season-by-working-day",
        }
    }

    /// Rows the breakdown groups over
    fn prepare<'a>(&self, table: &'a RideTable) -> Cow<'a, RideTable> {
        match self {
            Self::WeekdayByWorkingDay => Cow::Owned(calendar_consistent(table)),
            _ => Cow::Borrowed(table),
        }
    }

    /// Run this breakdown against its source table
    pub fn run(&self, table: &RideTable) -> Result<Vec<CategoryAggregate>> {
        let spec = self.spec();
        // column checks happen before any row filtering
        spec.validate(table)?;
        breakdown(&self.prepare(table), spec)
    }
}

impl fmt::Display for BreakdownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
