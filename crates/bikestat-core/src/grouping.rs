//! Categorical grouping keys
//!
//! Breakdowns and RFM scoring group rows by one of a closed set of keys.
//! [`GroupKey`] names the key and knows which source column backs it;
//! [`KeyValue`] is the value a row takes for that key. Ordering `KeyValue`s
//! of the same key yields the canonical chart order: Sunday→Saturday for
//! weekdays, Spring→Winter for seasons, ascending for everything else.

use crate::table::{Column, RideRecord};
use crate::types::{DayType, Season, WeatherCondition, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A categorical dimension rows can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Day of week derived from the date
    Weekday,
    /// Weather condition
    Weather,
    /// Hour of day
    Hour,
    /// Season
    Season,
    /// Working day vs weekend/holiday
    WorkingDay,
}

impl GroupKey {
    pub const ALL: [GroupKey; 5] = [
        GroupKey::Weekday,
        GroupKey::Weather,
        GroupKey::Hour,
        GroupKey::Season,
        GroupKey::WorkingDay,
    ];

    /// Source column the key is read or derived from
    pub fn column(&self) -> Column {
        match self {
            Self::Weekday => Column::Date,
            Self::Weather => Column::Weather,
            Self::Hour => Column::Hour,
            Self::Season => Column::Season,
            Self::WorkingDay => Column::WorkingDay,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Weekday => "weekday",
            Self::Weather => "weather",
            Self::Hour => "hour",
            Self::Season => "season",
            Self::WorkingDay => "working_day",
        }
    }

    /// The value a record takes for this key, if it has one
    pub fn extract(&self, record: &RideRecord) -> Option<KeyValue> {
        match self {
            Self::Weekday => record.date.map(|d| KeyValue::Weekday(d.weekday())),
            Self::Weather => record.weather.map(KeyValue::Weather),
            Self::Hour => record.hour.map(KeyValue::Hour),
            Self::Season => record.season.map(KeyValue::Season),
            Self::WorkingDay => record
                .working_day
                .map(|flag| KeyValue::WorkingDay(DayType::from_working_day(flag))),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "weekday" | "day" => Ok(Self::Weekday),
            "weather" | "weathersit" => Ok(Self::Weather),
            "hour" | "hr" => Ok(Self::Hour),
            "season" => Ok(Self::Season),
            "working_day" | "workingday" => Ok(Self::WorkingDay),
            _ => Err(format!("Invalid grouping key: {s}")),
        }
    }
}

/// The value of a grouping key for one row
///
/// Serializes as the bare value: a number for hours, the descriptive label
/// for every other key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    Weekday(Weekday),
    Weather(WeatherCondition),
    Hour(u8),
    Season(Season),
    WorkingDay(DayType),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekday(day) => write!(f, "{day}"),
            Self::Weather(weather) => write!(f, "{weather}"),
            Self::Hour(hour) => write!(f, "{hour}"),
            Self::Season(season) => write!(f, "{season}"),
            Self::WorkingDay(day_type) => write!(f, "{day_type}"),
        }
    }
}
