//! Aggregation data types for bikestat
//!
//! Pure data structures produced by the rollups, breakdowns and RFM scoring.
//! Every aggregate is derived and owned by the caller once returned; nothing
//! in the pipeline mutates it afterwards.

use crate::grouping::KeyValue;
use crate::types::{DailyDate, RideCounts, UserType, Weekday};
use serde::{Deserialize, Serialize};

/// One row per calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// Date of the rides
    pub date: DailyDate,
    /// Ride counts summed over the day
    pub rides: RideCounts,
    /// English day name derived from the date
    pub weekday: Weekday,
}

/// Mean ride count for one observed key combination
///
/// `secondary` is set for two-key breakdowns, which are emitted in long
/// form: one row per (primary, secondary) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    /// Value of the primary grouping key
    pub primary: KeyValue,
    /// Value of the secondary grouping key, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<KeyValue>,
    /// Mean of `total_rides` over the rows sharing this key
    pub mean_total_rides: f64,
    /// Number of rows behind the mean
    pub observations: usize,
}

/// Wide monthly rollup: registered and casual rides per year-month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyUsage {
    /// Year and month in YYYY-MM format
    pub month: String,
    /// Registered rides in the month
    pub registered: u64,
    /// Casual rides in the month
    pub casual: u64,
    /// Number of days with data in this month
    pub active_days: usize,
}

/// Long-form monthly row: one per (month, user type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyUserTypeCount {
    /// Year and month in YYYY-MM format
    pub year_month: String,
    /// Registered or casual
    pub user_type: UserType,
    /// Rides of that user type in the month
    pub total_count: u64,
}

/// Quintile scores of one RFM group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfmScores {
    /// Recency score, 5 for the most recent group
    pub r_score: u8,
    /// Frequency score, 5 for the most frequent group
    pub f_score: u8,
    /// Monetary score, 5 for the highest ride volume
    pub m_score: u8,
    /// The three digits concatenated, e.g. "451"
    pub combined_score: String,
}

impl RfmScores {
    pub fn new(r_score: u8, f_score: u8, m_score: u8) -> Self {
        Self {
            r_score,
            f_score,
            m_score,
            combined_score: format!("{r_score}{f_score}{m_score}"),
        }
    }
}

/// Label of an RFM group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RfmGroup {
    /// A categorical key value
    Key(KeyValue),
    /// A rider category
    UserType(UserType),
}

impl std::fmt::Display for RfmGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(value) => write!(f, "{value}"),
            Self::UserType(user_type) => write!(f, "{user_type}"),
        }
    }
}

/// Recency, frequency and monetary values of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmRow {
    /// Group label
    pub group: RfmGroup,
    /// Days between the dataset's latest date and the group's latest date
    pub recency: i64,
    /// Rows in the group
    pub frequency: usize,
    /// Rides in the group
    pub monetary: u64,
    /// Quintile scores, absent when scoring was skipped or impossible
    #[serde(flatten)]
    pub scores: Option<RfmScores>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeatherCondition;

    #[test]
    fn test_combined_score() {
        let scores = RfmScores::new(4, 5, 1);
        assert_eq!(scores.combined_score, "451");
    }

    #[test]
    fn test_rfm_row_serialization_flattens_scores() {
        let row = RfmRow {
            group: RfmGroup::Key(KeyValue::Hour(8)),
            recency: 0,
            frequency: 3,
            monetary: 120,
            scores: Some(RfmScores::new(5, 3, 2)),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["group"], 8);
        assert_eq!(json["r_score"], 5);
        assert_eq!(json["combined_score"], "532");

        let unscored = RfmRow { scores: None, ..row };
        let json = serde_json::to_value(&unscored).unwrap();
        assert!(json.get("r_score").is_none());
    }

    #[test]
    fn test_category_aggregate_serialization() {
        let row = CategoryAggregate {
            primary: KeyValue::Hour(0),
            secondary: Some(KeyValue::Weather(WeatherCondition::Clear)),
            mean_total_rides: 12.5,
            observations: 2,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["primary"], 0);
        assert_eq!(json["secondary"], "Clear");
    }
}
