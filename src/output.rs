//! Output formatting module for bikestat
//!
//! This module provides formatters for displaying ride reports in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use bikestat::aggregation::{Aggregator, Totals};
//! use bikestat::output::get_formatter;
//! use bikestat::table::{Granularity, RideRecord, RideTable};
//! use bikestat::types::RideCounts;
//! use chrono::NaiveDate;
//!
//! let table = RideTable::from_records(
//!     Granularity::Day,
//!     vec![RideRecord::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), RideCounts::new(1200, 34))],
//! );
//! let daily = Aggregator::aggregate_daily(&table);
//! let totals = Totals::from_daily(&daily);
//!
//! // Table output for the terminal
//! let formatter = get_formatter(false);
//! assert!(formatter.format_daily(&daily, &totals).contains("1,234"));
//!
//! // JSON output for other tools
//! let formatter = get_formatter(true);
//! assert!(formatter.format_daily(&daily, &totals).contains("\"daily\""));
//! ```

use crate::aggregation::Totals;
use crate::aggregation_types::{CategoryAggregate, DailyAggregate, MonthlyUserTypeCount};
use crate::breakdown::BreakdownKind;
use crate::dashboard::DashboardReport;
use crate::filters::DateRange;
use crate::grouping::GroupKey;
use crate::rfm::RfmReport;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;

/// Trait for output formatters
///
/// Implementations render each report of the CLI. Every method returns the
/// complete text to print.
pub trait OutputFormatter {
    /// Format the daily rollup with totals
    fn format_daily(&self, data: &[DailyAggregate], totals: &Totals) -> String;

    /// Format the long-form monthly rollup
    fn format_monthly(&self, data: &[MonthlyUserTypeCount]) -> String;

    /// Format headline metrics
    fn format_summary(
        &self,
        totals: &Totals,
        peak_day: Option<&DailyAggregate>,
        range: Option<&DateRange>,
    ) -> String;

    /// Format one categorical breakdown
    fn format_breakdown(&self, kind: BreakdownKind, rows: &[CategoryAggregate]) -> String;

    /// Format RFM rows
    fn format_rfm(&self, report: &RfmReport) -> String;

    /// Format a complete dashboard run
    fn format_dashboard(&self, report: &DashboardReport) -> String;
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display. Counts are formatted
/// with thousands separators and means with two decimals.
pub struct TableFormatter;

impl TableFormatter {
    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    fn format_mean(mean: f64) -> String {
        format!("{mean:.2}")
    }

    fn key_title(key: GroupKey) -> &'static str {
        match key {
            GroupKey::Weekday => "Weekday",
            GroupKey::Weather => "Weather",
            GroupKey::Hour => "Hour",
            GroupKey::Season => "Season",
            GroupKey::WorkingDay => "Day Type",
        }
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    /// Create a totals row for ride tables
    fn format_totals_row(totals: &Totals) -> Row {
        row![
            b -> "TOTAL",
            b -> Self::format_number(totals.rides.registered),
            b -> Self::format_number(totals.rides.casual),
            b -> Self::format_number(totals.rides.total)
        ]
    }
}

impl OutputFormatter for TableFormatter {
    fn format_daily(&self, data: &[DailyAggregate], totals: &Totals) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Date",
            b -> "Weekday",
            b -> "Registered",
            b -> "Casual",
            b -> "Total"
        ]);

        for day in data {
            table.add_row(row![
                day.date,
                day.weekday,
                r -> Self::format_number(day.rides.registered),
                r -> Self::format_number(day.rides.casual),
                r -> Self::format_number(day.rides.total)
            ]);
        }

        // Add separator
        table.add_row(Row::new(vec![Cell::new(""); 5]));

        let mut totals_row = Self::format_totals_row(totals);
        totals_row.insert_cell(1, Cell::new(""));
        table.add_row(totals_row);

        table.to_string()
    }

    fn format_monthly(&self, data: &[MonthlyUserTypeCount]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Month", b -> "User Type", b -> "Rides"]);

        for entry in data {
            table.add_row(row![
                entry.year_month,
                entry.user_type,
                r -> Self::format_number(entry.total_count)
            ]);
        }

        table.to_string()
    }

    fn format_summary(
        &self,
        totals: &Totals,
        peak_day: Option<&DailyAggregate>,
        range: Option<&DateRange>,
    ) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Metric", b -> "Value"]);

        if let Some(range) = range {
            table.add_row(row!["Range", format!("{} to {}", range.start(), range.end())]);
        }
        table.add_row(row!["Days", r -> Self::format_number(totals.days as u64)]);
        table.add_row(row!["Total rides", r -> Self::format_number(totals.rides.total)]);
        table.add_row(row!["Registered rides", r -> Self::format_number(totals.rides.registered)]);
        table.add_row(row!["Casual rides", r -> Self::format_number(totals.rides.casual)]);
        if let Some(mean) = totals.mean_daily_rides() {
            table.add_row(row!["Mean rides per day", r -> Self::format_mean(mean)]);
        }
        if let Some(peak) = peak_day {
            table.add_row(row![
                "Peak day",
                format!("{} ({})", peak.date, Self::format_number(peak.rides.total))
            ]);
        }

        table.to_string()
    }

    fn format_breakdown(&self, kind: BreakdownKind, rows: &[CategoryAggregate]) -> String {
        let spec = kind.spec();
        let mut table = Self::new_table();

        let mut titles = Row::new(vec![Cell::new(Self::key_title(spec.primary)).style_spec("b")]);
        if let Some(secondary) = spec.secondary {
            titles.add_cell(Cell::new(Self::key_title(secondary)).style_spec("b"));
        }
        titles.add_cell(Cell::new("Mean Rides").style_spec("b"));
        titles.add_cell(Cell::new("Rows").style_spec("b"));
        table.set_titles(titles);

        for entry in rows {
            let mut cells = vec![Cell::new(&entry.primary.to_string())];
            if let Some(secondary) = &entry.secondary {
                cells.push(Cell::new(&secondary.to_string()));
            }
            cells.push(Cell::new(&Self::format_mean(entry.mean_total_rides)).style_spec("r"));
            cells.push(Cell::new(&entry.observations.to_string()).style_spec("r"));
            table.add_row(Row::new(cells));
        }

        format!("{kind}\n{table}")
    }

    fn format_rfm(&self, report: &RfmReport) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Group",
            b -> "Recency",
            b -> "Frequency",
            b -> "Monetary",
            b -> "R",
            b -> "F",
            b -> "M",
            b -> "RFM"
        ]);

        for entry in &report.rows {
            let (r, f, m, combined) = match &entry.scores {
                Some(s) => (
                    s.r_score.to_string(),
                    s.f_score.to_string(),
                    s.m_score.to_string(),
                    s.combined_score.clone(),
                ),
                None => ("-".into(), "-".into(), "-".into(), "-".into()),
            };
            table.add_row(row![
                entry.group,
                r -> entry.recency,
                r -> Self::format_number(entry.frequency as u64),
                r -> Self::format_number(entry.monetary),
                c -> r,
                c -> f,
                c -> m,
                c -> combined
            ]);
        }

        let mut output = String::new();
        if let Some(reference) = report.reference_date {
            output.push_str(&format!("Reference date: {reference}\n"));
        }
        output.push_str(&table.to_string());
        if let Some(err) = &report.scoring_error {
            output.push_str(&format!("\nScores omitted: {err}\n"));
        }
        output
    }

    fn format_dashboard(&self, report: &DashboardReport) -> String {
        let mut sections = vec![
            format!(
                "=== SUMMARY ===\n{}",
                self.format_summary(&report.totals, report.peak_day.as_ref(), report.range.as_ref())
            ),
            format!("=== MONTHLY ===\n{}", self.format_monthly(&report.monthly)),
        ];

        for breakdown in &report.breakdowns {
            sections.push(format!(
                "=== BREAKDOWN ===\n{}",
                self.format_breakdown(breakdown.kind, &breakdown.rows)
            ));
        }

        if let Some(rfm) = &report.rfm {
            sections.push(format!("=== RFM ===\n{}", self.format_rfm(rfm)));
        }

        if !report.issues.is_empty() || !report.warnings.is_empty() {
            let mut notes = String::from("=== NOTES ===\n");
            for issue in &report.issues {
                notes.push_str(&format!("{}: {}\n", issue.stage, issue.message));
            }
            for warning in &report.warnings {
                notes.push_str(&format!("{warning}\n"));
            }
            sections.push(notes);
        }

        sections.join("\n")
    }
}

/// JSON formatter for machine-readable output
///
/// Produces pretty-printed JSON with raw, unformatted values.
pub struct JsonFormatter;

impl JsonFormatter {
    fn totals_json(totals: &Totals) -> serde_json::Value {
        json!({
            "registered": totals.rides.registered,
            "casual": totals.rides.casual,
            "total": totals.rides.total,
            "days": totals.days,
            "mean_daily_rides": totals.mean_daily_rides(),
        })
    }

    fn rfm_json(report: &RfmReport) -> serde_json::Value {
        json!({
            "reference_date": report.reference_date,
            "rows": report.rows,
            "scoring_error": report.scoring_error.as_ref().map(|e| e.to_string()),
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_daily(&self, data: &[DailyAggregate], totals: &Totals) -> String {
        let output = json!({
            "daily": data.iter().map(|d| json!({
                "date": d.date,
                "weekday": d.weekday,
                "registered": d.rides.registered,
                "casual": d.rides.casual,
                "total": d.rides.total,
            })).collect::<Vec<_>>(),
            "totals": Self::totals_json(totals),
        });

        format!("{output:#}")
    }

    fn format_monthly(&self, data: &[MonthlyUserTypeCount]) -> String {
        let output = json!({ "monthly": data });
        format!("{output:#}")
    }

    fn format_summary(
        &self,
        totals: &Totals,
        peak_day: Option<&DailyAggregate>,
        range: Option<&DateRange>,
    ) -> String {
        let output = json!({
            "range": range.map(|r| json!({ "start": r.start(), "end": r.end() })),
            "totals": Self::totals_json(totals),
            "peak_day": peak_day.map(|p| json!({ "date": p.date, "total": p.rides.total })),
        });
        format!("{output:#}")
    }

    fn format_breakdown(&self, kind: BreakdownKind, rows: &[CategoryAggregate]) -> String {
        let spec = kind.spec();
        let output = json!({
            "breakdown": kind,
            "primary_key": spec.primary,
            "secondary_key": spec.secondary,
            "rows": rows,
        });
        format!("{output:#}")
    }

    fn format_rfm(&self, report: &RfmReport) -> String {
        format!("{:#}", Self::rfm_json(report))
    }

    fn format_dashboard(&self, report: &DashboardReport) -> String {
        let output = json!({
            "range": report.range,
            "daily": report.daily,
            "totals": Self::totals_json(&report.totals),
            "peak_day": report.peak_day,
            "monthly": report.monthly,
            "breakdowns": report.breakdowns,
            "rfm": report.rfm.as_ref().map(Self::rfm_json),
            "issues": report.issues,
            "warnings": report.warnings,
        });
        format!("{output:#}")
    }
}

/// Get the appropriate formatter based on output preference
///
/// # Example
///
/// ```
/// use bikestat::output::get_formatter;
///
/// let formatter = get_formatter(true);
/// assert!(formatter.format_monthly(&[]).contains("\"monthly\""));
/// ```
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
