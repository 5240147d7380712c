//! Error types for bikestat
//!
//! This module defines the error types used throughout the bikestat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use bikestat_core::error::{BikestatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to BikestatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::table::Column;

/// Main error type for bikestat operations
///
/// Parameter-contract failures (`InvalidRange`, `InsufficientGroups`) and
/// column presence (`MissingColumn`) are the only errors the aggregation
/// pipeline raises itself; the rest come from loading and output.
#[derive(Error, Debug)]
pub enum BikestatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Start of a date range lies after its end
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// A column required by an operation is absent from the input table
    #[error("Missing column: {0}")]
    MissingColumn(Column),

    /// Not enough distinct groups to compute quintile scores
    #[error("Insufficient groups for quintile scoring: found {found}, need at least {required}")]
    InsufficientGroups {
        /// Number of distinct groups present
        found: usize,
        /// Minimum number of groups needed
        required: usize,
    },

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in bikestat
///
/// # Example
///
/// ```
/// use bikestat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, BikestatError>;
