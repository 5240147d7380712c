//! bikestat - Aggregate and score bike-sharing ride counts

use bikestat::{
    aggregation::{Aggregator, Totals, peak_day},
    cli::{Cli, Command},
    dashboard::{Dashboard, DashboardParams},
    data_loader::DataLoader,
    error::Result,
    output::get_formatter,
    rfm::RfmScorer,
    table::Granularity,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. RUST_LOG wins over the --verbose default.
    let default_filter = if cli.verbose { "bikestat=info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let range = cli.range_filter()?;
    let loader = DataLoader::new(&cli.data_dir)
        .with_day_file(&cli.day_file)
        .with_hour_file(&cli.hour_file);
    let formatter = get_formatter(cli.json);

    match cli.command.clone().unwrap_or(Command::Summary) {
        Command::Summary => {
            info!("Running summary report");
            let day = loader.load_day_table().await?;
            let resolved = range.resolve(&day)?;
            let filtered = range.apply_resolved(&day, &day)?;

            let daily = Aggregator::aggregate_daily(&filtered);
            let totals = Totals::from_daily(&daily);
            println!(
                "{}",
                formatter.format_summary(&totals, peak_day(&daily), resolved.as_ref())
            );
        }
        Command::Daily => {
            info!("Running daily report");
            let day = loader.load_day_table().await?;
            let filtered = range.apply_resolved(&day, &day)?;

            let daily = Aggregator::aggregate_daily(&filtered);
            if daily.is_empty() {
                warn!("No days in the selected range");
            }
            let totals = Totals::from_daily(&daily);
            println!("{}", formatter.format_daily(&daily, &totals));
        }
        Command::Monthly => {
            info!("Running monthly report");
            let day = loader.load_day_table().await?;
            let filtered = range.apply_resolved(&day, &day)?;

            let daily = Aggregator::aggregate_daily(&filtered);
            let monthly = Aggregator::monthly_by_user_type(&daily);
            if monthly.is_empty() {
                warn!("No months in the selected range");
            }
            println!("{}", formatter.format_monthly(&monthly));
        }
        Command::Breakdown { kind } => {
            info!("Running {} breakdown", kind);
            let (day, hour) = loader.load_tables().await?;
            let source = match kind.source() {
                Granularity::Day => &day,
                Granularity::Hour => &hour,
            };
            let filtered = range.apply_resolved(&day, source)?;

            let rows = kind.run(&filtered)?;
            if rows.is_empty() {
                warn!("Breakdown {} produced no rows for the selected range", kind);
            }
            println!("{}", formatter.format_breakdown(kind, &rows));
        }
        Command::Rfm { group_by, no_score } => {
            info!("Running RFM analysis by {}", group_by);
            let (day, hour) = loader.load_tables().await?;
            let source = match group_by.source() {
                Granularity::Day => &day,
                Granularity::Hour => &hour,
            };
            let filtered = range.apply_resolved(&day, source)?;

            let report = RfmScorer::new(group_by)
                .with_scores(!no_score)
                .run(&filtered)?;
            println!("{}", formatter.format_rfm(&report));
        }
        Command::Dashboard { rfm_group_by } => {
            info!("Running dashboard");
            let (day, hour) = loader.load_tables().await?;
            let params = DashboardParams::new()
                .with_range(range)
                .with_rfm_group_by(rfm_group_by);

            let report = Dashboard::new(&day, &hour).run(&params)?;
            println!("{}", formatter.format_dashboard(&report));
        }
    }

    Ok(())
}
