//! Basic usage example for bikestat
//!
//! This example loads the day and hour tables from `./dashboard` and prints
//! the headline metrics and the busiest day.

use bikestat::{
    Result,
    aggregation::{Aggregator, Totals, peak_day},
    data_loader::DataLoader,
};

#[tokio::main]
async fn main() -> Result<()> {
    let loader = DataLoader::new("./dashboard");
    let day = loader.load_day_table().await?;

    let daily = Aggregator::aggregate_daily(&day);
    let totals = Totals::from_daily(&daily);

    println!("Days:             {}", totals.days);
    println!("Total rides:      {}", totals.rides.total);
    println!("Registered rides: {}", totals.rides.registered);
    println!("Casual rides:     {}", totals.rides.casual);

    if let Some(peak) = peak_day(&daily) {
        println!(
            "Peak day:         {} ({}, {} rides)",
            peak.date, peak.weekday, peak.rides.total
        );
    }

    Ok(())
}
