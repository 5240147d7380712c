//! Shared test utilities for unit tests
//!
//! Integration tests (in tests/) cannot access this module because it's
//! marked with #[cfg(test)]; they have their own builders in
//! tests/common/mod.rs.

use crate::table::RideRecord;
use crate::types::RideCounts;
use chrono::NaiveDate;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A dated record with the given registered/casual split
pub fn day_record(year: i32, month: u32, day: u32, registered: u64, casual: u64) -> RideRecord {
    RideRecord::new(date(year, month, day), RideCounts::new(registered, casual))
}
