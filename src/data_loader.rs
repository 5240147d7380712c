//! Data loader module for the day and hour CSV tables
//!
//! Both tables live in one data directory, by default `./dashboard` with the
//! files `day_data.csv` and `hour_data.csv`. Files are read asynchronously
//! and parsed with the `csv` crate into [`RideTable`]s.
//!
//! Recognised headers are `dteday`, `hr`, `weathersit`, `workingday`,
//! `season`, `cnt`, `registered` and `casual`; any other column is ignored.
//! Categorical columns accept either the numeric codes of the raw dataset or
//! the descriptive labels of its cleaned exports.
//!
//! # Examples
//!
//! ```no_run
//! use bikestat::data_loader::DataLoader;
//!
//! # async fn example() -> bikestat::Result<()> {
//! let loader = DataLoader::new("./dashboard");
//! let (day, hour) = loader.load_tables().await?;
//! println!("{} days, {} hours", day.len(), hour.len());
//! # Ok(())
//! # }
//! ```

use crate::error::{BikestatError, Result};
use crate::table::{Column, Granularity, RideRecord, RideTable};
use crate::types::{RideCounts, Season, WeatherCondition};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default file name of the day-level table
pub const DEFAULT_DAY_FILE: &str = "day_data.csv";

/// Default file name of the hour-level table
pub const DEFAULT_HOUR_FILE: &str = "hour_data.csv";

/// One CSV row as it appears on disk
#[derive(Debug, Deserialize)]
struct RawRow {
    dteday: Option<String>,
    hr: Option<String>,
    weathersit: Option<String>,
    workingday: Option<String>,
    season: Option<String>,
    cnt: u64,
    registered: u64,
    casual: u64,
}

/// Loader for the day and hour tables of one data directory
#[derive(Debug, Clone)]
pub struct DataLoader {
    data_dir: PathBuf,
    day_file: String,
    hour_file: String,
}

impl DataLoader {
    /// Create a loader for `data_dir` with the default file names
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            day_file: DEFAULT_DAY_FILE.to_string(),
            hour_file: DEFAULT_HOUR_FILE.to_string(),
        }
    }

    /// Override the day table's file name
    pub fn with_day_file(mut self, file: impl Into<String>) -> Self {
        self.day_file = file.into();
        self
    }

    /// Override the hour table's file name
    pub fn with_hour_file(mut self, file: impl Into<String>) -> Self {
        self.hour_file = file.into();
        self
    }

    pub fn day_path(&self) -> PathBuf {
        self.data_dir.join(&self.day_file)
    }

    pub fn hour_path(&self) -> PathBuf {
        self.data_dir.join(&self.hour_file)
    }

    /// Load the day table, sorted by date
    pub async fn load_day_table(&self) -> Result<RideTable> {
        let mut table = Self::load_table(self.day_path(), Granularity::Day).await?;
        table.sort_by_date();
        Ok(table)
    }

    /// Load the hour table in file order
    pub async fn load_hour_table(&self) -> Result<RideTable> {
        Self::load_table(self.hour_path(), Granularity::Hour).await
    }

    /// Load both tables concurrently
    pub async fn load_tables(&self) -> Result<(RideTable, RideTable)> {
        tokio::try_join!(self.load_day_table(), self.load_hour_table())
    }

    async fn load_table(path: PathBuf, granularity: Granularity) -> Result<RideTable> {
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            BikestatError::Config(format!("Cannot read {} table {}: {e}", granularity, path.display()))
        })?;
        let table = parse_table(bytes.as_slice(), granularity, &path)?;
        debug!(
            "Loaded {} {} rows from {}",
            table.len(),
            granularity,
            path.display()
        );
        Ok(table)
    }
}

/// Parse a CSV table from any reader
///
/// `path` is only used in error messages. Fails with `MissingColumn` when a
/// required header is absent and with `Parse` on malformed values.
pub fn parse_table<R: Read>(reader: R, granularity: Granularity, path: &Path) -> Result<RideTable> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let present = |column: &Column| headers.iter().any(|h| h == column.name());

    if let Some(missing) = Column::REQUIRED.iter().find(|c| !present(c)) {
        return Err(BikestatError::MissingColumn(*missing));
    }
    let columns: Vec<Column> = Column::OPTIONAL.into_iter().filter(|c| present(c)).collect();

    let mut records = Vec::new();
    let mut undated = 0usize;
    let mut inconsistent = 0usize;

    for (index, result) in rdr.deserialize::<RawRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let raw = result.map_err(|e| parse_error(path, e))?;
        let record = parse_record(raw).map_err(|e| parse_error(path, format!("line {line}: {e}")))?;

        if record.date.is_none() {
            undated += 1;
        }
        if !record.rides.is_consistent() {
            inconsistent += 1;
        }
        records.push(record);
    }

    if undated > 0 {
        warn!(
            "{} rows in {} have an unparseable date and are excluded from date-based reports",
            undated,
            path.display()
        );
    }
    if inconsistent > 0 {
        warn!(
            "{} rows in {} have cnt != registered + casual",
            inconsistent,
            path.display()
        );
    }

    Ok(RideTable::new(granularity, columns, records))
}

fn parse_error(path: &Path, error: impl std::fmt::Display) -> BikestatError {
    BikestatError::Parse {
        file: path.to_path_buf(),
        error: error.to_string(),
    }
}

fn parse_record(raw: RawRow) -> std::result::Result<RideRecord, String> {
    let rides = RideCounts {
        total: raw.cnt,
        registered: raw.registered,
        casual: raw.casual,
    };

    let mut record = match raw.dteday.as_deref().and_then(parse_row_date) {
        Some(date) => RideRecord::new(date, rides),
        None => {
            debug!("Unparseable dteday value {:?}", raw.dteday);
            RideRecord::undated(rides)
        }
    };

    if let Some(hr) = raw.hr {
        let hour = hr
            .parse::<u8>()
            .ok()
            .filter(|h| *h < 24)
            .ok_or_else(|| format!("Invalid hour: {hr}"))?;
        record = record.with_hour(hour);
    }
    if let Some(weather) = raw.weathersit {
        record = record.with_weather(weather.parse::<WeatherCondition>()?);
    }
    if let Some(working_day) = raw.workingday {
        record = record.with_working_day(parse_working_day(&working_day)?);
    }
    if let Some(season) = raw.season {
        record = record.with_season(season.parse::<Season>()?);
    }

    Ok(record)
}

/// Parse `dteday`, ignoring a trailing time component
fn parse_row_date(value: &str) -> Option<NaiveDate> {
    let day_part = value.split(['T', ' ']).next().unwrap_or(value);
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

fn parse_working_day(value: &str) -> std::result::Result<bool, String> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "weekday" => Ok(true),
        "0" | "false" | "weekend" => Ok(false),
        _ => Err(format!("Invalid workingday value: {value}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    const DAY_CSV: &str = "\
instant,dteday,season,yr,mnth,holiday,weekday,workingday,weathersit,temp,casual,registered,cnt
2,2011-01-02,1,0,1,0,0,0,2,0.36,131,670,801
1,2011-01-01,1,0,1,0,6,0,2,0.34,331,654,985
3,2011-01-03,1,0,1,0,1,1,1,0.19,120,1229,1349
";

    async fn write_file(dir: &TempDir, name: &str, contents: &str) {
        let mut file = tokio::fs::File::create(dir.path().join(name)).await.unwrap();
        file.write_all(contents.as_bytes()).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_day_table_sorted() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, DEFAULT_DAY_FILE, DAY_CSV).await;

        let table = DataLoader::new(temp_dir.path()).load_day_table().await.unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.granularity(), Granularity::Day);
        assert!(table.has_column(Column::Season));
        assert!(!table.has_column(Column::Hour));

        let first = &table.records()[0];
        assert_eq!(first.date.unwrap().to_string(), "2011-01-01");
        assert_eq!(first.rides, RideCounts::new(654, 331));
        assert_eq!(first.weather, Some(WeatherCondition::MistCloudy));
        assert_eq!(first.working_day, Some(false));
        assert_eq!(first.season, Some(Season::Spring));
    }

    #[tokio::test]
    async fn test_load_tables_with_labels() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir, "day.csv", DAY_CSV).await;
        write_file(
            &temp_dir,
            "hour.csv",
            "dteday,hr,season,workingday,weathersit,casual,registered,cnt\n\
             2011-01-01 00:00:00,0,Springer,Weekend,Clear,3,13,16\n\
             2011-01-01,1,Springer,Weekend,Mist + Cloudy,8,32,40\n",
        )
        .await;

        let loader = DataLoader::new(temp_dir.path())
            .with_day_file("day.csv")
            .with_hour_file("hour.csv");
        let (day, hour) = loader.load_tables().await.unwrap();
        assert_eq!(day.len(), 3);
        assert_eq!(hour.len(), 2);
        assert_eq!(hour.records()[0].hour, Some(0));
        assert_eq!(hour.records()[0].date.unwrap().to_string(), "2011-01-01");
        assert_eq!(hour.records()[1].weather, Some(WeatherCondition::MistCloudy));
        assert_eq!(hour.records()[1].season, Some(Season::Spring));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = DataLoader::new(temp_dir.path()).load_hour_table().await;
        assert!(matches!(result, Err(BikestatError::Config(_))));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "dteday,registered,casual\n2011-01-01,1,2\n";
        let result = parse_table(csv.as_bytes(), Granularity::Day, Path::new("day.csv"));
        assert!(matches!(
            result,
            Err(BikestatError::MissingColumn(Column::Total))
        ));
    }

    #[test]
    fn test_unparseable_date_kept_undated() {
        let csv = "dteday,casual,registered,cnt\nnot-a-date,1,2,3\n2011-01-01,1,1,2\n";
        let table = parse_table(csv.as_bytes(), Granularity::Day, Path::new("day.csv")).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.records()[0].date.is_none());
        assert_eq!(table.records()[1].date.unwrap().to_string(), "2011-01-01");
    }

    #[test]
    fn test_malformed_values() {
        let csv = "dteday,casual,registered,cnt\n2011-01-01,1,x,3\n";
        let result = parse_table(csv.as_bytes(), Granularity::Day, Path::new("day.csv"));
        match result {
            Err(BikestatError::Parse { file, .. }) => assert_eq!(file, PathBuf::from("day.csv")),
            other => panic!("Expected Parse error, got {other:?}"),
        }

        let csv = "dteday,hr,casual,registered,cnt\n2011-01-01,24,1,2,3\n";
        let result = parse_table(csv.as_bytes(), Granularity::Hour, Path::new("hour.csv"));
        assert!(matches!(result, Err(BikestatError::Parse { .. })));
    }

    #[test]
    fn test_working_day_values() {
        assert_eq!(parse_working_day("1"), Ok(true));
        assert_eq!(parse_working_day("Weekend"), Ok(false));
        assert!(parse_working_day("maybe").is_err());
    }
}
