//! Aggregation module for daily and monthly rollups
//!
//! This module turns ride tables of either granularity into one row per
//! calendar day, and daily rows into per-month sums split by user type.
//!
//! # Examples
//!
//! ```
//! use bikestat::aggregation::{Aggregator, Totals};
//! use bikestat::table::{Granularity, RideRecord, RideTable};
//! use bikestat::types::RideCounts;
//! use chrono::NaiveDate;
//!
//! let table = RideTable::from_records(
//!     Granularity::Day,
//!     vec![
//!         RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), RideCounts::new(80, 20)),
//!         RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 2).unwrap(), RideCounts::new(150, 50)),
//!     ],
//! );
//!
//! // Aggregate by day
//! let daily = Aggregator::aggregate_daily(&table);
//! assert_eq!(daily.len(), 2);
//!
//! // Create monthly rollups in long form
//! let monthly = Aggregator::monthly_by_user_type(&daily);
//! assert_eq!(monthly.len(), 2);
//!
//! let totals = Totals::from_daily(&daily);
//! assert_eq!(totals.rides.total, 300);
//! ```

use crate::aggregation_types::{DailyAggregate, MonthlyUsage, MonthlyUserTypeCount};
use crate::table::{RideRecord, RideTable};
use crate::types::{DailyDate, RideCounts, UserType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Accumulator for daily aggregation
#[derive(Default)]
struct DailyAccumulator {
    rides: RideCounts,
    rows: usize,
}

impl DailyAccumulator {
    fn add_record(&mut self, record: &RideRecord) {
        self.rides += record.rides;
        self.rows += 1;
    }

    fn into_daily_aggregate(self, date: DailyDate) -> DailyAggregate {
        DailyAggregate {
            date,
            rides: self.rides,
            weekday: date.weekday(),
        }
    }
}

/// Accumulator for monthly aggregation
#[derive(Default)]
struct MonthlyAccumulator {
    registered: u64,
    casual: u64,
    days: usize,
}

/// Rollup engine for daily and monthly summaries
pub struct Aggregator;

impl Aggregator {
    /// Aggregate rows by calendar date
    ///
    /// Works on day and hour tables alike: hourly rows of the same date are
    /// summed into one row. Output is sorted ascending by date and has
    /// exactly one row per distinct date. Undated rows are skipped.
    pub fn aggregate_daily(table: &RideTable) -> Vec<DailyAggregate> {
        let mut daily_map: BTreeMap<DailyDate, DailyAccumulator> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in table.records() {
            match record.date {
                Some(date) => daily_map.entry(date).or_default().add_record(record),
                None => skipped += 1,
            }
        }

        debug!(
            "Aggregated {} {} rows into {} days ({} undated rows skipped)",
            table.len() - skipped,
            table.granularity(),
            daily_map.len(),
            skipped
        );

        daily_map
            .into_iter()
            .map(|(date, acc)| acc.into_daily_aggregate(date))
            .collect()
    }

    /// Aggregate daily rows into per-month registered and casual sums
    ///
    /// Months without any day are absent; output is chronological.
    pub fn aggregate_monthly(daily: &[DailyAggregate]) -> Vec<MonthlyUsage> {
        let mut monthly_map: BTreeMap<String, MonthlyAccumulator> = BTreeMap::new();

        for day in daily {
            let acc = monthly_map.entry(day.date.year_month()).or_default();
            acc.registered += day.rides.registered;
            acc.casual += day.rides.casual;
            acc.days += 1;
        }

        monthly_map
            .into_iter()
            .map(|(month, acc)| MonthlyUsage {
                month,
                registered: acc.registered,
                casual: acc.casual,
                active_days: acc.days,
            })
            .collect()
    }

    /// Monthly rollup reshaped to long form by user type
    pub fn monthly_by_user_type(daily: &[DailyAggregate]) -> Vec<MonthlyUserTypeCount> {
        melt_user_types(&Self::aggregate_monthly(daily))
    }
}

/// Reshape wide monthly rows into one row per (month, user type)
///
/// Rows are grouped by user type: every registered row in chronological
/// order, followed by every casual row.
pub fn melt_user_types(monthly: &[MonthlyUsage]) -> Vec<MonthlyUserTypeCount> {
    UserType::ALL
        .iter()
        .flat_map(|user_type| {
            monthly.iter().map(move |m| MonthlyUserTypeCount {
                year_month: m.month.clone(),
                user_type: *user_type,
                total_count: match user_type {
                    UserType::Registered => m.registered,
                    UserType::Casual => m.casual,
                },
            })
        })
        .collect()
}

/// Headline metrics over a daily rollup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Summed ride counts
    pub rides: RideCounts,
    /// Number of days covered
    pub days: usize,
}

impl Totals {
    pub fn from_daily(daily: &[DailyAggregate]) -> Self {
        let mut totals = Self::default();
        for day in daily {
            totals.rides += day.rides;
            totals.days += 1;
        }
        totals
    }

    pub fn from_monthly(monthly: &[MonthlyUsage]) -> Self {
        let mut totals = Self::default();
        for month in monthly {
            totals.rides += RideCounts::new(month.registered, month.casual);
            totals.days += month.active_days;
        }
        totals
    }

    /// Mean total rides per day, `None` for an empty rollup
    pub fn mean_daily_rides(&self) -> Option<f64> {
        (self.days > 0).then(|| self.rides.total as f64 / self.days as f64)
    }
}

/// The day with the most total rides
///
/// On ties the earliest day wins.
pub fn peak_day(daily: &[DailyAggregate]) -> Option<&DailyAggregate> {
    daily
        .iter()
        .fold(None, |best: Option<&DailyAggregate>, day| match best {
            Some(b) if b.rides.total >= day.rides.total => Some(b),
            _ => Some(day),
        })
}
