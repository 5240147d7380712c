//! Example of exporting the full dashboard as JSON
//!
//! This example runs every report with RFM grouped by weekday and writes the
//! result to `dashboard.json`.

use bikestat::{
    Result,
    dashboard::{Dashboard, DashboardParams},
    data_loader::DataLoader,
    grouping::GroupKey,
    output::{JsonFormatter, OutputFormatter},
    rfm::RfmGroupBy,
};

#[tokio::main]
async fn main() -> Result<()> {
    let (day, hour) = DataLoader::new("./dashboard").load_tables().await?;

    let params = DashboardParams::new().with_rfm_group_by(RfmGroupBy::Key(GroupKey::Weekday));
    let report = Dashboard::new(&day, &hour).run(&params)?;

    for issue in &report.issues {
        eprintln!("skipped {}: {}", issue.stage, issue.message);
    }

    let json = JsonFormatter.format_dashboard(&report);
    tokio::fs::write("dashboard.json", json).await?;
    println!("Wrote dashboard.json");

    Ok(())
}
