//! One-pass dashboard pipeline
//!
//! [`Dashboard`] runs every report over the day and hour tables with one set
//! of parameters: the date range is resolved against the day table and
//! applied to both tables, then the daily and monthly rollups, every
//! [`BreakdownKind`] and the RFM scoring are computed in turn.
//!
//! Only an invalid date range aborts the run. A stage that fails, such as a
//! breakdown whose column is missing, is recorded as a [`StageIssue`] and the
//! remaining stages still run; empty results are reported as warnings.
//!
//! # Examples
//!
//! ```
//! use bikestat::dashboard::{Dashboard, DashboardParams};
//! use bikestat::table::{Granularity, RideRecord, RideTable};
//! use bikestat::types::RideCounts;
//! use chrono::NaiveDate;
//!
//! let day = RideTable::from_records(
//!     Granularity::Day,
//!     vec![RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), RideCounts::new(80, 20))],
//! );
//! let hour = RideTable::from_records(Granularity::Hour, Vec::new());
//!
//! let report = Dashboard::new(&day, &hour).run(&DashboardParams::default()).unwrap();
//! assert_eq!(report.totals.rides.total, 100);
//! ```

use crate::aggregation::{Aggregator, Totals, peak_day};
use crate::aggregation_types::{CategoryAggregate, DailyAggregate, MonthlyUserTypeCount};
use crate::breakdown::BreakdownKind;
use crate::error::Result;
use crate::filters::{DateRange, RangeFilter};
use crate::grouping::GroupKey;
use crate::rfm::{RfmGroupBy, RfmReport, RfmScorer};
use crate::table::{Granularity, RideTable};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Parameters of a dashboard run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardParams {
    /// Date bounds; unset bounds default to the day table's span
    pub range: RangeFilter,
    /// RFM grouping dimension
    pub rfm_group_by: RfmGroupBy,
    /// Whether to assign RFM quintile scores
    pub rfm_scores: bool,
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self {
            range: RangeFilter::new(),
            rfm_group_by: RfmGroupBy::Key(GroupKey::Hour),
            rfm_scores: true,
        }
    }
}

impl DashboardParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: RangeFilter) -> Self {
        self.range = range;
        self
    }

    pub fn with_rfm_group_by(mut self, group_by: RfmGroupBy) -> Self {
        self.rfm_group_by = group_by;
        self
    }

    pub fn with_rfm_scores(mut self, rfm_scores: bool) -> Self {
        self.rfm_scores = rfm_scores;
        self
    }
}

/// Pipeline stages that can fail or come back empty on their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Daily,
    Monthly,
    Breakdown(BreakdownKind),
    Rfm,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => f.write_str("daily"),
            Self::Monthly => f.write_str("monthly"),
            Self::Breakdown(kind) => write!(f, "breakdown {kind}"),
            Self::Rfm => f.write_str("rfm"),
        }
    }
}

/// A stage that failed without aborting the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageIssue {
    pub stage: Stage,
    pub message: String,
}

/// Rows of one categorical chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownResult {
    pub kind: BreakdownKind,
    pub rows: Vec<CategoryAggregate>,
}

/// Everything a dashboard run produces
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    /// Resolved date range, `None` when the day table has no dated rows
    pub range: Option<DateRange>,
    pub daily: Vec<DailyAggregate>,
    pub totals: Totals,
    pub peak_day: Option<DailyAggregate>,
    /// Long-form monthly rollup
    pub monthly: Vec<MonthlyUserTypeCount>,
    /// Successful breakdowns, in [`BreakdownKind::ALL`] order
    pub breakdowns: Vec<BreakdownResult>,
    /// RFM rows, `None` when the stage failed
    pub rfm: Option<RfmReport>,
    /// Stages that failed
    pub issues: Vec<StageIssue>,
    /// Stages that produced no rows
    pub warnings: Vec<String>,
}

impl DashboardReport {
    /// Rows of one breakdown, if it succeeded
    pub fn breakdown(&self, kind: BreakdownKind) -> Option<&[CategoryAggregate]> {
        self.breakdowns
            .iter()
            .find(|b| b.kind == kind)
            .map(|b| b.rows.as_slice())
    }

    fn record_issue(&mut self, stage: Stage, message: String) {
        warn!("Skipping {}: {}", stage, message);
        self.issues.push(StageIssue { stage, message });
    }

    fn check_empty(&mut self, stage: Stage, is_empty: bool) {
        if is_empty {
            warn!("{} produced no rows for the selected range", stage);
            self.warnings.push(format!("{stage} produced no rows"));
        }
    }
}

/// The dashboard pipeline over a day and an hour table
pub struct Dashboard<'a> {
    day: &'a RideTable,
    hour: &'a RideTable,
}

impl<'a> Dashboard<'a> {
    pub fn new(day: &'a RideTable, hour: &'a RideTable) -> Self {
        Self { day, hour }
    }

    /// Run every stage
    ///
    /// Fails only with `InvalidRange`. Identical inputs give identical
    /// reports.
    pub fn run(&self, params: &DashboardParams) -> Result<DashboardReport> {
        let range = params.range.resolve(self.day)?;
        let (day, hour) = match range {
            Some(range) => (range.apply(self.day), range.apply(self.hour)),
            // no dated rows to take a default from
            None => (
                params.range.apply(self.day)?,
                params.range.apply(self.hour)?,
            ),
        };
        debug!(
            "Dashboard over {} day rows and {} hour rows",
            day.len(),
            hour.len()
        );

        let daily = Aggregator::aggregate_daily(&day);
        let totals = Totals::from_daily(&daily);
        let peak_day = peak_day(&daily).cloned();
        let monthly = Aggregator::monthly_by_user_type(&daily);

        let mut report = DashboardReport {
            range,
            daily,
            totals,
            peak_day,
            monthly,
            breakdowns: Vec::new(),
            rfm: None,
            issues: Vec::new(),
            warnings: Vec::new(),
        };
        report.check_empty(Stage::Daily, report.daily.is_empty());
        report.check_empty(Stage::Monthly, report.monthly.is_empty());

        let (day_rows, hour_rows) = (&day, &hour);
        let filtered = move |granularity| match granularity {
            Granularity::Day => day_rows,
            Granularity::Hour => hour_rows,
        };

        for kind in BreakdownKind::ALL {
            match kind.run(filtered(kind.source())) {
                Ok(rows) => {
                    report.check_empty(Stage::Breakdown(kind), rows.is_empty());
                    report.breakdowns.push(BreakdownResult { kind, rows });
                }
                Err(e) => report.record_issue(Stage::Breakdown(kind), e.to_string()),
            }
        }

        let scorer = RfmScorer::new(params.rfm_group_by).with_scores(params.rfm_scores);
        match scorer.run(filtered(params.rfm_group_by.source())) {
            Ok(rfm) => {
                report.check_empty(Stage::Rfm, rfm.rows.is_empty());
                if let Some(err) = &rfm.scoring_error {
                    report.issues.push(StageIssue {
                        stage: Stage::Rfm,
                        message: err.to_string(),
                    });
                }
                report.rfm = Some(rfm);
            }
            Err(e) => report.record_issue(Stage::Rfm, e.to_string()),
        }

        Ok(report)
    }
}
