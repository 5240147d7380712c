//! Ride records and the in-memory tables the pipeline consumes
//!
//! A [`RideTable`] is either the day table (one row per calendar date) or the
//! hour table (one row per date and hour). Besides its rows it remembers which
//! optional columns its source actually provided, so that a breakdown keyed
//! on an absent column can fail with [`BikestatError::MissingColumn`] instead
//! of silently producing an empty chart.

use crate::error::{BikestatError, Result};
use crate::types::{DailyDate, RideCounts, Season, WeatherCondition};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Row granularity of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// One row per calendar date
    Day,
    /// One row per date and hour of day
    Hour,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Hour => write!(f, "hour"),
        }
    }
}

/// Columns of the source dataset, named as in its CSV header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Date,
    Hour,
    Weather,
    WorkingDay,
    Season,
    Total,
    Registered,
    Casual,
}

impl Column {
    /// Columns every table has
    pub const REQUIRED: [Column; 4] = [
        Column::Date,
        Column::Total,
        Column::Registered,
        Column::Casual,
    ];

    /// Columns a table may lack
    pub const OPTIONAL: [Column; 4] = [
        Column::Hour,
        Column::Weather,
        Column::WorkingDay,
        Column::Season,
    ];

    /// Header name in the source CSV
    pub fn name(&self) -> &'static str {
        match self {
            Self::Date => "dteday",
            Self::Hour => "hr",
            Self::Weather => "weathersit",
            Self::WorkingDay => "workingday",
            Self::Season => "season",
            Self::Total => "cnt",
            Self::Registered => "registered",
            Self::Casual => "casual",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single row of the day or hour table
///
/// `date` is `None` when the source value could not be parsed; such rows are
/// dropped by the range filter and ignored by every date-keyed rollup.
///
/// # Examples
/// ```
/// use bikestat_core::table::RideRecord;
/// use bikestat_core::types::{RideCounts, WeatherCondition};
/// use chrono::NaiveDate;
///
/// let record = RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), RideCounts::new(80, 20))
///     .with_hour(8)
///     .with_weather(WeatherCondition::Clear);
/// assert_eq!(record.rides.total, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    /// Calendar date of the row
    pub date: Option<DailyDate>,
    /// Hour of day (0-23), hour table only
    pub hour: Option<u8>,
    /// Weather situation
    pub weather: Option<WeatherCondition>,
    /// Working-day flag (false for weekends and holidays)
    pub working_day: Option<bool>,
    /// Season
    pub season: Option<Season>,
    /// Ride counters
    pub rides: RideCounts,
}

impl RideRecord {
    /// Create a dated record with no categorical attributes
    pub fn new(date: NaiveDate, rides: RideCounts) -> Self {
        Self {
            date: Some(DailyDate::new(date)),
            ..Self::undated(rides)
        }
    }

    /// Create a record whose date is unknown
    pub fn undated(rides: RideCounts) -> Self {
        Self {
            date: None,
            hour: None,
            weather: None,
            working_day: None,
            season: None,
            rides,
        }
    }

    pub fn with_hour(mut self, hour: u8) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn with_weather(mut self, weather: WeatherCondition) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_working_day(mut self, working_day: bool) -> Self {
        self.working_day = Some(working_day);
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }
}

/// An ordered set of ride records plus the columns its source provided
#[derive(Debug, Clone, PartialEq)]
pub struct RideTable {
    granularity: Granularity,
    columns: BTreeSet<Column>,
    records: Vec<RideRecord>,
}

impl RideTable {
    /// Create a table with an explicit column set
    ///
    /// The required columns are always considered present.
    pub fn new(
        granularity: Granularity,
        columns: impl IntoIterator<Item = Column>,
        records: Vec<RideRecord>,
    ) -> Self {
        let mut columns: BTreeSet<Column> = columns.into_iter().collect();
        columns.extend(Column::REQUIRED);
        Self {
            granularity,
            columns,
            records,
        }
    }

    /// Create a table, inferring optional columns from the records
    ///
    /// An optional column counts as present when at least one record carries
    /// a value for it. An empty table is assumed to have every column.
    pub fn from_records(granularity: Granularity, records: Vec<RideRecord>) -> Self {
        let columns: Vec<Column> = if records.is_empty() {
            Column::OPTIONAL.to_vec()
        } else {
            Column::OPTIONAL
                .into_iter()
                .filter(|column| {
                    records.iter().any(|r| match column {
                        Column::Hour => r.hour.is_some(),
                        Column::Weather => r.weather.is_some(),
                        Column::WorkingDay => r.working_day.is_some(),
                        Column::Season => r.season.is_some(),
                        _ => true,
                    })
                })
                .collect()
        };
        Self::new(granularity, columns, records)
    }

    /// A table with the same granularity and columns but different rows
    pub fn with_records(&self, records: Vec<RideRecord>) -> Self {
        Self {
            granularity: self.granularity,
            columns: self.columns.clone(),
            records,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn records(&self) -> &[RideRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Fail with `MissingColumn` unless the column is present
    pub fn require_column(&self, column: Column) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(BikestatError::MissingColumn(column))
        }
    }

    /// Earliest and latest date among dated rows
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));
        Some((*min.inner(), *max.inner()))
    }

    /// Sort rows by date, then hour; undated rows go last
    pub fn sort_by_date(&mut self) {
        self.records
            .sort_by_key(|r| (r.date.is_none(), r.date, r.hour));
    }
}
