//! Core domain types for bikestat
//!
//! This module contains the categorical vocabulary of the bike-sharing
//! dataset (weekday, weather condition, season, day type, user type) and the
//! ride counters that every rollup sums. The declaration order of each enum
//! is its canonical chart order, so `Ord` on these types is the ordering
//! every breakdown uses.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Calendar date used as the daily aggregation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }

    /// English weekday of this date
    pub fn weekday(&self) -> Weekday {
        Weekday::from(self.0.weekday())
    }

    /// Year-month bucket key in `YYYY-MM` form
    pub fn year_month(&self) -> String {
        self.format("%Y-%m")
    }

    /// Whole days from `self` to `later` (negative when `later` is earlier)
    pub fn days_until(&self, later: &DailyDate) -> i64 {
        (later.0 - self.0).num_days()
    }
}

impl From<NaiveDate> for DailyDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day of the week, ordered Sunday through Saturday
///
/// # Examples
/// ```
/// use bikestat_core::types::Weekday;
///
/// assert!(Weekday::Sunday < Weekday::Monday);
/// assert_eq!(Weekday::Saturday.name(), "Saturday");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All weekdays in canonical order
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Locale-independent English day name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// Saturday or Sunday
    pub fn is_weekend(&self) -> bool {
        matches!(self, Self::Saturday | Self::Sunday)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weather situation recorded for a row
///
/// The numeric codes are the dataset's `weathersit` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeatherCondition {
    #[serde(rename = "Clear")]
    Clear,
    #[serde(rename = "Mist + Cloudy")]
    MistCloudy,
    #[serde(rename = "Light Snow")]
    LightSnow,
    #[serde(rename = "Heavy Rain")]
    HeavyRain,
}

impl WeatherCondition {
    /// Map a `weathersit` code (1-4) to a condition
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Clear),
            2 => Some(Self::MistCloudy),
            3 => Some(Self::LightSnow),
            4 => Some(Self::HeavyRain),
            _ => None,
        }
    }

    /// The `weathersit` code of this condition
    pub fn code(&self) -> u8 {
        match self {
            Self::Clear => 1,
            Self::MistCloudy => 2,
            Self::LightSnow => 3,
            Self::HeavyRain => 4,
        }
    }

    /// Descriptive label shown in breakdowns
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::MistCloudy => "Mist + Cloudy",
            Self::LightSnow => "Light Snow",
            Self::HeavyRain => "Heavy Rain",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for WeatherCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| format!("Invalid weather code: {s}"));
        }
        match trimmed.to_lowercase().as_str() {
            "clear" => Ok(Self::Clear),
            "mist + cloudy" | "mist" | "cloudy" => Ok(Self::MistCloudy),
            "light snow" => Ok(Self::LightSnow),
            "heavy rain" => Ok(Self::HeavyRain),
            _ => Err(format!("Invalid weather condition: {s}")),
        }
    }
}

/// Season, ordered Spring through Winter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Map a `season` code (1-4) to a season
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Spring),
            2 => Some(Self::Summer),
            3 => Some(Self::Fall),
            4 => Some(Self::Winter),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| format!("Invalid season code: {s}"));
        }
        match trimmed.to_lowercase().as_str() {
            // cleaned exports of the dataset spell spring as "Springer"
            "spring" | "springer" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            "winter" => Ok(Self::Winter),
            _ => Err(format!("Invalid season: {s}")),
        }
    }
}

/// Working-day classification of a row
///
/// `Weekend` sorts before `Weekday`, matching the 0/1 encoding of the
/// `workingday` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayType {
    Weekend,
    Weekday,
}

impl DayType {
    /// Classify from the working-day flag
    pub fn from_working_day(is_working_day: bool) -> Self {
        if is_working_day {
            Self::Weekday
        } else {
            Self::Weekend
        }
    }

    pub fn is_working_day(&self) -> bool {
        matches!(self, Self::Weekday)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Weekend => "Weekend",
            Self::Weekday => "Weekday",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rider category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "Registered Users")]
    Registered,
    #[serde(rename = "Casual Users")]
    Casual,
}

impl UserType {
    pub const ALL: [UserType; 2] = [UserType::Registered, UserType::Casual];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Registered => "Registered Users",
            Self::Casual => "Casual Users",
        }
    }

    /// Rides of this user type within a set of counts
    pub fn rides(&self, counts: &RideCounts) -> u64 {
        match self {
            Self::Registered => counts.registered,
            Self::Casual => counts.casual,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ride counters for a row or an aggregate
///
/// # Examples
/// ```
/// use bikestat_core::types::RideCounts;
///
/// let counts = RideCounts::new(80, 20);
/// assert_eq!(counts.total, 100);
///
/// let combined = counts + RideCounts::new(150, 50);
/// assert_eq!(combined.total, 300);
/// assert_eq!(combined.casual, 70);
/// ```
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RideCounts {
    /// All rides (`cnt`)
    pub total: u64,
    /// Rides by registered users
    pub registered: u64,
    /// Rides by casual users
    pub casual: u64,
}

impl RideCounts {
    /// Create counts from the registered/casual split
    pub fn new(registered: u64, casual: u64) -> Self {
        Self {
            total: registered + casual,
            registered,
            casual,
        }
    }

    /// Whether `total == registered + casual`
    pub fn is_consistent(&self) -> bool {
        self.total == self.registered + self.casual
    }
}

impl Add for RideCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            registered: self.registered + other.registered,
            casual: self.casual + other.casual,
        }
    }
}

impl AddAssign for RideCounts {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.registered += other.registered;
        self.casual += other.casual;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_weekday_from_date() {
        let sunday = DailyDate::new(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap());
        let monday = DailyDate::new(NaiveDate::from_ymd_opt(2012, 1, 2).unwrap());
        assert_eq!(sunday.weekday(), Weekday::Sunday);
        assert_eq!(monday.weekday(), Weekday::Monday);
    }

    #[test]
    fn test_weekday_order() {
        let mut days = vec![Weekday::Saturday, Weekday::Monday, Weekday::Sunday];
        days.sort();
        assert_eq!(
            days,
            vec![Weekday::Sunday, Weekday::Monday, Weekday::Saturday]
        );
        assert!(Weekday::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_weather_codes() {
        for code in 1..=4 {
            let condition = WeatherCondition::from_code(code).unwrap();
            assert_eq!(condition.code(), code);
        }
        assert_eq!(WeatherCondition::from_code(0), None);
        assert_eq!(WeatherCondition::MistCloudy.label(), "Mist + Cloudy");
        assert_eq!(
            WeatherCondition::from_str("Light Snow").unwrap(),
            WeatherCondition::LightSnow
        );
        assert_eq!(
            WeatherCondition::from_str("4").unwrap(),
            WeatherCondition::HeavyRain
        );
    }

    #[test]
    fn test_season_parsing() {
        assert_eq!(Season::from_str("1").unwrap(), Season::Spring);
        assert_eq!(Season::from_str("Springer").unwrap(), Season::Spring);
        assert_eq!(Season::from_str("winter").unwrap(), Season::Winter);
        assert!(Season::from_str("monsoon").is_err());
        assert!(Season::Spring < Season::Summer && Season::Fall < Season::Winter);
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&WeatherCondition::MistCloudy).unwrap(),
            "\"Mist + Cloudy\""
        );
        assert_eq!(
            serde_json::to_string(&UserType::Casual).unwrap(),
            "\"Casual Users\""
        );
        assert_eq!(
            serde_json::to_string(&Weekday::Friday).unwrap(),
            "\"Friday\""
        );
    }

    #[test]
    fn test_day_type_order() {
        assert!(DayType::Weekend < DayType::Weekday);
        assert_eq!(DayType::from_working_day(true), DayType::Weekday);
        assert_eq!(DayType::from_working_day(false).label(), "Weekend");
    }

    #[test]
    fn test_ride_counts_arithmetic() {
        let mut counts = RideCounts::new(80, 20);
        counts += RideCounts::new(150, 50);
        assert_eq!(counts.total, 300);
        assert!(counts.is_consistent());

        let skewed = RideCounts {
            total: 10,
            registered: 3,
            casual: 3,
        };
        assert!(!skewed.is_consistent());
    }

    #[test]
    fn test_days_until() {
        let a = DailyDate::new(NaiveDate::from_ymd_opt(2012, 12, 25).unwrap());
        let b = DailyDate::new(NaiveDate::from_ymd_opt(2012, 12, 31).unwrap());
        assert_eq!(a.days_until(&b), 6);
        assert_eq!(b.days_until(&a), -6);
        assert_eq!(a.year_month(), "2012-12");
    }
}
