//! Filtering module for ride tables
//!
//! This module restricts tables to an inclusive date interval and, for the
//! weekday × working-day chart, to rows whose working-day flag agrees with
//! the calendar.
//!
//! # Examples
//!
//! ```
//! use bikestat_core::filters::RangeFilter;
//! use chrono::NaiveDate;
//!
//! // Create a filter for January 2012
//! let filter = RangeFilter::new()
//!     .with_since(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap())
//!     .with_until(NaiveDate::from_ymd_opt(2012, 1, 31).unwrap());
//! assert!(filter.validate().is_ok());
//! ```

use crate::error::{BikestatError, Result};
use crate::table::{RideRecord, RideTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A validated, inclusive date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, failing with `InvalidRange` when `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(BikestatError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The full date span of a table, or `None` if it has no dated rows
    pub fn full_span(table: &RideTable) -> Option<Self> {
        table
            .date_span()
            .map(|(start, end)| Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        &self.start <= date && date <= &self.end
    }

    /// Rows of `table` dated within the range, as a new table
    pub fn apply(&self, table: &RideTable) -> RideTable {
        let records: Vec<RideRecord> = table
            .records()
            .iter()
            .filter(|r| r.date.is_some_and(|d| self.contains(d.inner())))
            .cloned()
            .collect();

        debug!(
            "Date range {}..={} kept {} of {} {} rows",
            self.start,
            self.end,
            records.len(),
            table.len(),
            table.granularity()
        );
        table.with_records(records)
    }
}

/// Filter configuration for ride tables
///
/// Both bounds are optional and inclusive. An unset bound is open, or, via
/// [`RangeFilter::resolve`], taken from a reference table's date span.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    /// Start date filter (inclusive)
    pub since_date: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub until_date: Option<NaiveDate>,
}

impl RangeFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start date filter
    pub fn with_since(mut self, date: NaiveDate) -> Self {
        self.since_date = Some(date);
        self
    }

    /// Set the end date filter
    pub fn with_until(mut self, date: NaiveDate) -> Self {
        self.until_date = Some(date);
        self
    }

    /// Check that the bounds are ordered
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.since_date, self.until_date) {
            DateRange::new(start, end)?;
        }
        Ok(())
    }

    /// Check if a record passes the filter
    ///
    /// Undated records never match.
    pub fn matches(&self, record: &RideRecord) -> bool {
        let Some(date) = record.date else {
            return false;
        };
        let date = date.inner();

        if let Some(since) = &self.since_date {
            if date < since {
                return false;
            }
        }

        if let Some(until) = &self.until_date {
            if date > until {
                return false;
            }
        }

        true
    }

    /// Filter a table, returning the matching rows as a new table
    pub fn apply(&self, table: &RideTable) -> Result<RideTable> {
        self.validate()?;
        let records = table
            .records()
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        Ok(table.with_records(records))
    }

    /// Fill unset bounds from the date span of `reference`
    ///
    /// Returns `Ok(None)` when a bound is unset and `reference` has no dated
    /// rows to take it from.
    pub fn resolve(&self, reference: &RideTable) -> Result<Option<DateRange>> {
        self.validate()?;
        let span = reference.date_span();
        let start = self.since_date.or(span.map(|(start, _)| start));
        let end = self.until_date.or(span.map(|(_, end)| end));
        match (start, end) {
            (Some(start), Some(end)) => DateRange::new(start, end).map(Some),
            _ => Ok(None),
        }
    }

    /// Filter `table` with unset bounds taken from `reference`
    ///
    /// Used to restrict the hour table to the day table's span.
    pub fn apply_resolved(&self, reference: &RideTable, table: &RideTable) -> Result<RideTable> {
        match self.resolve(reference)? {
            Some(range) => Ok(range.apply(table)),
            None => self.apply(table),
        }
    }
}

/// Restrict a table to an inclusive date interval
///
/// Fails with `InvalidRange` when `start > end`. Rows without a date are
/// excluded. The input table is left untouched.
pub fn filter_by_range(table: &RideTable, start: NaiveDate, end: NaiveDate) -> Result<RideTable> {
    Ok(DateRange::new(start, end)?.apply(table))
}

/// Keep rows whose working-day flag agrees with the calendar
///
/// Monday–Friday rows must be flagged as working days and Saturday/Sunday
/// rows as non-working; holidays falling on a weekday are dropped, as are
/// rows missing either the date or the flag.
pub fn calendar_consistent(table: &RideTable) -> RideTable {
    let records = table
        .records()
        .iter()
        .filter(|r| match (r.date, r.working_day) {
            (Some(date), Some(working_day)) => date.weekday().is_weekend() != working_day,
            _ => false,
        })
        .cloned()
        .collect();
    table.with_records(records)
}
