//! Recency / Frequency / Monetary scoring
//!
//! Groups a timestamped table by a categorical dimension and measures, per
//! group, how recently it saw rides (`recency`), how many rows it has
//! (`frequency`) and how many rides it accumulated (`monetary`). Each metric
//! can then be binned into quintiles across the groups.
//!
//! Recency is measured against one reference date, the latest date of the
//! whole input, computed once and shared by every group.
//!
//! # Examples
//!
//! ```
//! use bikestat::grouping::GroupKey;
//! use bikestat::rfm::{RfmGroupBy, RfmScorer};
//! use bikestat::table::{Granularity, RideRecord, RideTable};
//! use bikestat::types::RideCounts;
//! use chrono::NaiveDate;
//!
//! let records = (0..6u8)
//!     .map(|hour| {
//!         RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), RideCounts::new(hour as u64 * 10, 0))
//!             .with_hour(hour)
//!     })
//!     .collect();
//! let table = RideTable::from_records(Granularity::Hour, records);
//!
//! let report = RfmScorer::new(RfmGroupBy::Key(GroupKey::Hour)).run(&table).unwrap();
//! assert_eq!(report.rows.len(), 6);
//! assert!(report.scoring_error.is_none());
//! assert_eq!(report.rows[5].scores.as_ref().unwrap().m_score, 5);
//! ```

use crate::aggregation_types::{RfmGroup, RfmRow, RfmScores};
use crate::error::{BikestatError, Result};
use crate::grouping::GroupKey;
use crate::table::{Granularity, RideRecord, RideTable};
use crate::types::{DailyDate, UserType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Fewest groups quintile scoring is defined for
pub const MIN_SCORING_GROUPS: usize = 5;

/// Dimension RFM groups are formed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RfmGroupBy {
    /// A categorical key such as the hour of day
    Key(GroupKey),
    /// Registered vs casual riders
    ///
    /// A row belongs to a user type's group when that type rode at least
    /// once in it; monetary sums only that type's rides.
    UserType,
}

impl RfmGroupBy {
    /// Which table the grouping is computed over
    ///
    /// Hour-of-day groups need the hour table; every other dimension reads
    /// the day table.
    pub fn source(&self) -> Granularity {
        match self {
            Self::Key(GroupKey::Hour) => Granularity::Hour,
            _ => Granularity::Day,
        }
    }
}

impl fmt::Display for RfmGroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::UserType => write!(f, "user_type"),
        }
    }
}

impl std::str::FromStr for RfmGroupBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "user_type" | "usertype" | "registered" | "casual" => Ok(Self::UserType),
            other => other.parse::<GroupKey>().map(Self::Key),
        }
    }
}

/// Per-group running values
struct RfmAccumulator {
    last_date: DailyDate,
    rows: usize,
    rides: u64,
}

impl RfmAccumulator {
    fn new(date: DailyDate) -> Self {
        Self {
            last_date: date,
            rows: 0,
            rides: 0,
        }
    }

    fn add(&mut self, date: DailyDate, rides: u64) {
        self.last_date = self.last_date.max(date);
        self.rows += 1;
        self.rides += rides;
    }
}

/// Result of an RFM run
///
/// When scoring was requested but could not be performed, `rows` still hold
/// the raw values and `scoring_error` says why.
#[derive(Debug, Serialize)]
pub struct RfmReport {
    /// Latest date of the input, the recency reference
    pub reference_date: Option<DailyDate>,
    /// One row per group, ascending by group
    pub rows: Vec<RfmRow>,
    /// Why scores are missing, if they were requested
    #[serde(skip)]
    pub scoring_error: Option<BikestatError>,
}

/// RFM calculator for one grouping dimension
#[derive(Debug, Clone)]
pub struct RfmScorer {
    group_by: RfmGroupBy,
    with_scores: bool,
}

impl RfmScorer {
    /// Create a scorer that also assigns quintile scores
    pub fn new(group_by: RfmGroupBy) -> Self {
        Self {
            group_by,
            with_scores: true,
        }
    }

    /// Enable or disable quintile scoring
    pub fn with_scores(mut self, with_scores: bool) -> Self {
        self.with_scores = with_scores;
        self
    }

    pub fn group_by(&self) -> RfmGroupBy {
        self.group_by
    }

    /// Compute raw recency, frequency and monetary per group
    ///
    /// Undated rows are ignored. Fails with `MissingColumn` when the
    /// grouping column is absent.
    pub fn compute(&self, table: &RideTable) -> Result<Vec<RfmRow>> {
        if let RfmGroupBy::Key(key) = self.group_by {
            table.require_column(key.column())?;
        }

        let Some(reference) = table.records().iter().filter_map(|r| r.date).max() else {
            return Ok(Vec::new());
        };

        let mut groups: BTreeMap<RfmGroup, RfmAccumulator> = BTreeMap::new();
        for record in table.records() {
            let Some(date) = record.date else {
                continue;
            };
            for (group, rides) in self.memberships(record) {
                groups
                    .entry(group)
                    .or_insert_with(|| RfmAccumulator::new(date))
                    .add(date, rides);
            }
        }

        debug!(
            "RFM by {} over {} rows: {} groups, reference date {}",
            self.group_by,
            table.len(),
            groups.len(),
            reference
        );

        Ok(groups
            .into_iter()
            .map(|(group, acc)| RfmRow {
                group,
                recency: acc.last_date.days_until(&reference),
                frequency: acc.rows,
                monetary: acc.rides,
                scores: None,
            })
            .collect())
    }

    /// Groups a record contributes to, with the rides it adds to each
    fn memberships(&self, record: &RideRecord) -> Vec<(RfmGroup, u64)> {
        match self.group_by {
            RfmGroupBy::Key(key) => key
                .extract(record)
                .map(|value| vec![(RfmGroup::Key(value), record.rides.total)])
                .unwrap_or_default(),
            RfmGroupBy::UserType => UserType::ALL
                .iter()
                .map(|user_type| (*user_type, user_type.rides(&record.rides)))
                .filter(|(_, rides)| *rides > 0)
                .map(|(user_type, rides)| (RfmGroup::UserType(user_type), rides))
                .collect(),
        }
    }

    /// Compute RFM rows and, if enabled, their scores
    ///
    /// An `InsufficientGroups` failure does not fail the run: the raw rows
    /// are returned and the error is kept in the report.
    pub fn run(&self, table: &RideTable) -> Result<RfmReport> {
        let mut rows = self.compute(table)?;
        let reference_date = table.records().iter().filter_map(|r| r.date).max();

        let scoring_error = if self.with_scores {
            assign_scores(&mut rows).err()
        } else {
            None
        };
        if let Some(err) = &scoring_error {
            warn!("RFM scores omitted for {}: {}", self.group_by, err);
        }

        Ok(RfmReport {
            reference_date,
            rows,
            scoring_error,
        })
    }
}

/// Assign quintile scores to every row
///
/// Frequency and monetary are scored directly (lowest → 1, highest → 5);
/// recency inversely (most recent → 5). Fails with `InsufficientGroups`,
/// leaving the rows unscored, when there are fewer than five rows.
pub fn assign_scores(rows: &mut [RfmRow]) -> Result<()> {
    if rows.len() < MIN_SCORING_GROUPS {
        return Err(BikestatError::InsufficientGroups {
            found: rows.len(),
            required: MIN_SCORING_GROUPS,
        });
    }

    let recency: Vec<f64> = rows.iter().map(|r| r.recency as f64).collect();
    let frequency: Vec<f64> = rows.iter().map(|r| r.frequency as f64).collect();
    let monetary: Vec<f64> = rows.iter().map(|r| r.monetary as f64).collect();

    let r_edges = quintile_edges(&recency);
    let f_edges = quintile_edges(&frequency);
    let m_edges = quintile_edges(&monetary);

    for (i, row) in rows.iter_mut().enumerate() {
        let r_score = 6 - quintile(recency[i], &r_edges);
        let f_score = quintile(frequency[i], &f_edges);
        let m_score = quintile(monetary[i], &m_edges);
        row.scores = Some(RfmScores::new(r_score, f_score, m_score));
    }

    Ok(())
}

/// The 20th/40th/60th/80th percentiles, linearly interpolated
///
/// `values` must be non-empty.
pub fn quintile_edges(values: &[f64]) -> [f64; 4] {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len() - 1;
    [0.2, 0.4, 0.6, 0.8].map(|q| {
        let position = q * last as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let fraction = position - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    })
}

/// Bucket 1-5 of `value`; a value equal to an edge falls into the lower bucket
pub fn quintile(value: f64, edges: &[f64; 4]) -> u8 {
    1 + edges.iter().filter(|edge| value > **edge).count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::KeyValue;
    use crate::table::Granularity;
    use crate::types::RideCounts;
    use chrono::NaiveDate;

    fn hourly(day: u32, hour: u8, registered: u64, casual: u64) -> RideRecord {
        RideRecord::new(
            NaiveDate::from_ymd_opt(2012, 1, day).unwrap(),
            RideCounts::new(registered, casual),
        )
        .with_hour(hour)
    }

    fn rows_with_monetary(values: &[u64]) -> Vec<RfmRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, m)| RfmRow {
                group: RfmGroup::Key(KeyValue::Hour(i as u8)),
                recency: 0,
                frequency: 1,
                monetary: *m,
                scores: None,
            })
            .collect()
    }

    #[test]
    fn test_quintile_edges_interpolate() {
        let edges = quintile_edges(&[50.0, 10.0, 30.0, 20.0, 40.0]);
        assert_eq!(edges, [18.0, 26.0, 34.0, 42.0]);
    }

    #[test]
    fn test_boundary_ties_fall_low() {
        // six values put every edge exactly on a data point
        let edges = quintile_edges(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(edges, [2.0, 3.0, 4.0, 5.0]);
        assert_eq!(quintile(2.0, &edges), 1);
        assert_eq!(quintile(2.5, &edges), 2);
        assert_eq!(quintile(6.0, &edges), 5);
    }

    #[test]
    fn test_monetary_scores_for_five_groups() {
        let mut rows = rows_with_monetary(&[30, 10, 50, 20, 40]);
        assign_scores(&mut rows).unwrap();
        let m: Vec<u8> = rows.iter().map(|r| r.scores.as_ref().unwrap().m_score).collect();
        assert_eq!(m, vec![3, 1, 5, 2, 4]);
    }

    #[test]
    fn test_recency_is_inverted() {
        let mut rows = rows_with_monetary(&[1, 2, 3, 4, 5]);
        for (row, recency) in rows.iter_mut().zip([0, 3, 10, 20, 40]) {
            row.recency = recency;
        }
        assign_scores(&mut rows).unwrap();
        let r: Vec<u8> = rows.iter().map(|r| r.scores.as_ref().unwrap().r_score).collect();
        assert_eq!(r, vec![5, 4, 3, 2, 1]);
        assert_eq!(rows[0].scores.as_ref().unwrap().combined_score, "511");
    }

    #[test]
    fn test_insufficient_groups() {
        let mut rows = rows_with_monetary(&[1, 2, 3, 4]);
        let err = assign_scores(&mut rows).unwrap_err();
        assert!(matches!(
            err,
            BikestatError::InsufficientGroups {
                found: 4,
                required: 5
            }
        ));
        assert!(rows.iter().all(|r| r.scores.is_none()));
    }

    #[test]
    fn test_reference_date_is_dataset_wide() {
        // hour 0 only appears on Jan 1; hour 1 appears on Jan 1 and Jan 5
        let table = RideTable::from_records(
            Granularity::Hour,
            vec![
                hourly(1, 0, 10, 0),
                hourly(1, 1, 5, 5),
                hourly(5, 1, 1, 1),
            ],
        );
        let rows = RfmScorer::new(RfmGroupBy::Key(GroupKey::Hour))
            .compute(&table)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group, RfmGroup::Key(KeyValue::Hour(0)));
        assert_eq!(rows[0].recency, 4);
        assert_eq!(rows[0].frequency, 1);
        assert_eq!(rows[0].monetary, 10);
        assert_eq!(rows[1].recency, 0);
        assert_eq!(rows[1].frequency, 2);
        assert_eq!(rows[1].monetary, 12);
    }

    #[test]
    fn test_user_type_groups_keep_raw_values() {
        let table = RideTable::from_records(
            Granularity::Hour,
            vec![
                hourly(1, 0, 10, 3),
                hourly(2, 0, 7, 0),
                hourly(3, 0, 4, 0),
            ],
        );
        let report = RfmScorer::new(RfmGroupBy::UserType).run(&table).unwrap();
        assert!(matches!(
            report.scoring_error,
            Some(BikestatError::InsufficientGroups { found: 2, .. })
        ));
        assert_eq!(report.rows.len(), 2);

        let registered = &report.rows[0];
        assert_eq!(registered.group, RfmGroup::UserType(UserType::Registered));
        assert_eq!((registered.recency, registered.frequency, registered.monetary), (0, 3, 21));

        let casual = &report.rows[1];
        assert_eq!((casual.recency, casual.frequency, casual.monetary), (2, 1, 3));
        assert!(casual.scores.is_none());
    }

    #[test]
    fn test_scoring_disabled() {
        let records = (0..6).map(|h| hourly(1, h, 1, 0)).collect();
        let table = RideTable::from_records(Granularity::Hour, records);
        let report = RfmScorer::new(RfmGroupBy::Key(GroupKey::Hour))
            .with_scores(false)
            .run(&table)
            .unwrap();
        assert!(report.scoring_error.is_none());
        assert!(report.rows.iter().all(|r| r.scores.is_none()));
    }

    #[test]
    fn test_missing_group_column() {
        let table = RideTable::from_records(
            Granularity::Day,
            vec![RideRecord::new(
                NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(),
                RideCounts::new(1, 1),
            )],
        );
        let result = RfmScorer::new(RfmGroupBy::Key(GroupKey::Hour)).compute(&table);
        assert!(matches!(result, Err(BikestatError::MissingColumn(_))));
    }

    #[test]
    fn test_group_by_parsing() {
        assert_eq!("hr".parse::<RfmGroupBy>().unwrap(), RfmGroupBy::Key(GroupKey::Hour));
        assert_eq!("registered".parse::<RfmGroupBy>().unwrap(), RfmGroupBy::UserType);
        assert!("temp".parse::<RfmGroupBy>().is_err());
    }
}
