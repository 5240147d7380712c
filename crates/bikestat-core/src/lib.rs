//! Core types, errors, and filters for bikestat
//!
//! This crate provides the ride record model, the categorical grouping keys,
//! error handling, and the date-range filter shared by the aggregation
//! pipeline and the command-line front end.

pub mod aggregation_types;
pub mod error;
pub mod filters;
pub mod grouping;
pub mod table;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{BikestatError, Result};
pub use grouping::{GroupKey, KeyValue};
pub use table::{Column, Granularity, RideRecord, RideTable};
pub use types::{DailyDate, DayType, RideCounts, Season, UserType, WeatherCondition, Weekday};
