//! CLI interface for bikestat
//!
//! This module defines the command-line interface using clap. Every report
//! reads the same pair of CSV tables; global flags select where they live,
//! the date range, and the output format.
//!
//! # Example
//!
//! ```bash
//! # Daily rides for January 2012
//! bikestat daily --since 2012-01 --until 2012-01
//!
//! # Hour-of-day RFM scores as JSON
//! bikestat rfm --group-by hour --json
//!
//! # Every chart at once
//! bikestat --data-dir ./dashboard dashboard
//! ```

use crate::breakdown::BreakdownKind;
use crate::error::{BikestatError, Result};
use crate::filters::RangeFilter;
use crate::rfm::RfmGroupBy;
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Analyze bike-sharing ride counts
#[derive(Parser, Debug, Clone)]
#[command(name = "bikestat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory containing the day and hour CSV files
    #[arg(long, env = "BIKESTAT_DATA_DIR", default_value = "./dashboard", global = true)]
    pub data_dir: PathBuf,

    /// File name of the day-level table inside the data directory
    #[arg(long, default_value = crate::data_loader::DEFAULT_DAY_FILE, global = true)]
    pub day_file: String,

    /// File name of the hour-level table inside the data directory
    #[arg(long, default_value = crate::data_loader::DEFAULT_HOUR_FILE, global = true)]
    pub hour_file: String,

    /// Filter by start date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Filter by end date (YYYY-MM-DD or YYYY-MM, the latter meaning the month's last day)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Build the date filter from `--since` and `--until`
    pub fn range_filter(&self) -> Result<RangeFilter> {
        let mut filter = RangeFilter::new();
        if let Some(since) = &self.since {
            filter = filter.with_since(parse_date_filter(since)?);
        }
        if let Some(until) = &self.until {
            filter = filter.with_until(parse_until_filter(until)?);
        }
        filter.validate()?;
        Ok(filter)
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show headline totals and the peak day
    Summary,
    /// Show rides per day
    Daily,
    /// Show rides per month by user type
    Monthly,
    /// Show mean rides per category
    Breakdown {
        /// Which categorical chart to compute
        #[arg(value_enum)]
        kind: BreakdownKind,
    },
    /// Show recency, frequency and monetary values per group
    Rfm {
        /// Grouping dimension (hour, weekday, weather, season, working_day, user_type)
        #[arg(long, short = 'g', default_value = "hour")]
        group_by: RfmGroupBy,

        /// Skip quintile scoring and show raw values only
        #[arg(long)]
        no_score: bool,
    },
    /// Run every report in one pass
    Dashboard {
        /// RFM grouping dimension
        #[arg(long, short = 'g', default_value = "hour")]
        rfm_group_by: RfmGroupBy,
    },
}

/// Parse date filter from string
///
/// Accepts dates in YYYY-MM-DD or YYYY-MM format.
/// For YYYY-MM format, defaults to the first day of the month.
///
/// # Example
///
/// ```
/// use bikestat::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2012-01-15").unwrap();
/// assert_eq!(date.day(), 15);
///
/// let date = parse_date_filter("2012-02").unwrap();
/// assert_eq!(date.month(), 2);
/// assert_eq!(date.day(), 1);
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    // Try YYYY-MM-DD format first
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let (year, month) = parse_year_month(date_str)?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| BikestatError::InvalidDate(format!("Invalid date: {date_str}")))
}

/// Parse an end-of-range date
///
/// Same formats as [`parse_date_filter`], but YYYY-MM resolves to the last
/// day of the month so that `--until 2012-02` covers all of February.
pub fn parse_until_filter(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let (year, month) = parse_year_month(date_str)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .filter(|last| last.year() == year)
        .ok_or_else(|| BikestatError::InvalidDate(format!("Invalid date: {date_str}")))
}

fn parse_year_month(date_str: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() != 2 {
        return Err(BikestatError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )));
    }

    let year = parts[0]
        .parse::<i32>()
        .map_err(|_| BikestatError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
    let month = parts[1]
        .parse::<u32>()
        .map_err(|_| BikestatError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

    if !(1..=12).contains(&month) {
        return Err(BikestatError::InvalidDate(format!(
            "Month must be between 1-12, got {month}"
        )));
    }
    Ok((year, month))
}
