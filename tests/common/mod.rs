//! Common test utilities and helpers for bikestat tests
//!
//! This module provides a ride record builder, table helpers and CSV fixture
//! writers shared by the integration tests.

#![allow(dead_code)]

use bikestat::{
    table::{Granularity, RideRecord, RideTable},
    types::{RideCounts, Season, WeatherCondition},
};
use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Header row shared by the CSV fixtures
pub const CSV_HEADER: &str = "dteday,hr,season,workingday,weathersit,casual,registered,cnt";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builder for creating test RideRecord instances
pub struct RideRecordBuilder {
    date: NaiveDate,
    hour: Option<u8>,
    weather: Option<WeatherCondition>,
    working_day: Option<bool>,
    season: Option<Season>,
    registered: u64,
    casual: u64,
}

impl RideRecordBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            date: date(2012, 1, 1),
            hour: None,
            weather: None,
            working_day: None,
            season: None,
            registered: 100,
            casual: 10,
        }
    }

    pub fn date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.date = date(year, month, day);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn hour(mut self, hour: u8) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn weather(mut self, weather: WeatherCondition) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn working_day(mut self, working_day: bool) -> Self {
        self.working_day = Some(working_day);
        self
    }

    /// Mark as working day when the date falls Monday to Friday
    pub fn calendar_working_day(mut self) -> Self {
        self.working_day = Some(self.date.weekday().num_days_from_monday() < 5);
        self
    }

    pub fn season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    pub fn rides(mut self, registered: u64, casual: u64) -> Self {
        self.registered = registered;
        self.casual = casual;
        self
    }

    pub fn build(self) -> RideRecord {
        let mut record = RideRecord::new(self.date, RideCounts::new(self.registered, self.casual));
        record.hour = self.hour;
        record.weather = self.weather;
        record.working_day = self.working_day;
        record.season = self.season;
        record
    }
}

impl Default for RideRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully populated day table covering `days` consecutive days from 2012-01-01
pub fn day_table(days: u32) -> RideTable {
    let start = date(2012, 1, 1);
    let records = (0..days)
        .map(|offset| {
            let day = start + chrono::Duration::days(offset as i64);
            RideRecordBuilder::new()
                .on(day)
                .calendar_working_day()
                .season(season_of(day))
                .weather(weather_of(offset as u64))
                .rides(1000 + offset as u64 * 7, 100 + (offset as u64 % 13) * 11)
                .build()
        })
        .collect();
    RideTable::from_records(Granularity::Day, records)
}

/// A fully populated hour table: every hour of `days` days from 2012-01-01
pub fn hour_table(days: u32) -> RideTable {
    let start = date(2012, 1, 1);
    let mut records = Vec::new();
    for offset in 0..days {
        let day = start + chrono::Duration::days(offset as i64);
        for hour in 0..24u8 {
            records.push(
                RideRecordBuilder::new()
                    .on(day)
                    .hour(hour)
                    .calendar_working_day()
                    .season(season_of(day))
                    .weather(weather_of(offset as u64 + hour as u64))
                    .rides(hour as u64 * 5 + offset as u64, hour as u64 % 4)
                    .build(),
            );
        }
    }
    RideTable::from_records(Granularity::Hour, records)
}

fn season_of(date: NaiveDate) -> Season {
    match date.month() {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Fall,
        _ => Season::Winter,
    }
}

fn weather_of(n: u64) -> WeatherCondition {
    match n % 5 {
        0 | 1 => WeatherCondition::Clear,
        2 | 3 => WeatherCondition::MistCloudy,
        _ => WeatherCondition::LightSnow,
    }
}

/// Render records as CSV with [`CSV_HEADER`]
pub fn to_csv(records: &[RideRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for r in records {
        let line = format!(
            "{},{},{},{},{},{},{},{}\n",
            r.date.map(|d| d.to_string()).unwrap_or_default(),
            r.hour.map(|h| h.to_string()).unwrap_or_default(),
            r.season.map(|s| s.name().to_string()).unwrap_or_default(),
            r.working_day.map(|w| if w { "1" } else { "0" }).unwrap_or_default(),
            r.weather.map(|w| w.code().to_string()).unwrap_or_default(),
            r.rides.casual,
            r.rides.registered,
            r.rides.total,
        );
        csv.push_str(&line);
    }
    csv
}

/// Test fixture holding a data directory with day and hour CSV files
pub struct CsvFixture {
    pub temp_dir: TempDir,
}

impl CsvFixture {
    pub async fn new(day: &RideTable, hour: &RideTable) -> Self {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path().join("day_data.csv"), &to_csv(day.records())).await;
        write_file(temp_dir.path().join("hour_data.csv"), &to_csv(hour.records())).await;
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }
}

async fn write_file(path: PathBuf, contents: &str) {
    let mut file = fs::File::create(path).await.unwrap();
    file.write_all(contents.as_bytes()).await.unwrap();
}
