//! bikestat - Aggregate and score bike-sharing ride counts
//!
//! This library provides functionality to:
//! - Load day- and hour-level ride tables from CSV files
//! - Restrict them to a date range and roll them up per day and per month
//! - Compute mean-ride breakdowns by weekday, hour, weather, season and day type
//! - Score groups by recency, frequency and monetary value
//! - Generate reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use bikestat::{
//!     aggregation::{Aggregator, Totals},
//!     data_loader::DataLoader,
//!     filters::RangeFilter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> bikestat::Result<()> {
//!     let loader = DataLoader::new("./dashboard");
//!     let day = loader.load_day_table().await?;
//!
//!     let filtered = RangeFilter::new().apply(&day)?;
//!     let daily = Aggregator::aggregate_daily(&filtered);
//!     println!("{} rides", Totals::from_daily(&daily).rides.total);
//!
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod breakdown;
pub mod cli;
pub mod dashboard;
pub mod data_loader;
pub mod output;
pub mod rfm;

// Shared model, errors and filters live in bikestat-core
pub use bikestat_core::{aggregation_types, error, filters, grouping, table, types};

// Re-export commonly used types
pub use error::{BikestatError, Result};
pub use grouping::{GroupKey, KeyValue};
pub use table::{Column, Granularity, RideRecord, RideTable};
pub use types::{DailyDate, RideCounts, UserType, WeatherCondition, Weekday};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
