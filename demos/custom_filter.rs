//! Example of restricting reports to a date range
//!
//! This example filters both tables to the summer of 2012 and prints the
//! mean rides per hour of day under each weather condition.

use bikestat::{
    Result, breakdown::hourly_weather_breakdown, data_loader::DataLoader, filters::RangeFilter,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<()> {
    let (day, hour) = DataLoader::new("./dashboard").load_tables().await?;

    let filter = RangeFilter::new()
        .with_since(NaiveDate::from_ymd_opt(2012, 6, 1).unwrap())
        .with_until(NaiveDate::from_ymd_opt(2012, 8, 31).unwrap());

    println!("Filtering data for June-August 2012...\n");
    let summer_hours = filter.apply_resolved(&day, &hour)?;

    let rows = hourly_weather_breakdown(&summer_hours)?;
    if rows.is_empty() {
        println!("No hourly data found for the summer of 2012");
        return Ok(());
    }

    for row in rows {
        if let Some(weather) = row.secondary {
            println!(
                "{:>2}:00  {:<16} {:>8.1} rides",
                row.primary.to_string(),
                weather.to_string(),
                row.mean_total_rides
            );
        }
    }

    Ok(())
}
