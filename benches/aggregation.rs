use bikestat::{
    aggregation::Aggregator,
    breakdown::BreakdownKind,
    table::{Granularity, RideRecord, RideTable},
    types::{RideCounts, Season, WeatherCondition},
};
use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Hour table with `days` full days starting 2011-01-01
fn create_hour_table(days: usize) -> RideTable {
    let start = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
    let mut records = Vec::with_capacity(days * 24);

    for day in 0..days {
        let date = start + chrono::Duration::days(day as i64);
        for hour in 0..24u8 {
            let i = day * 24 + hour as usize;
            records.push(
                RideRecord::new(date, RideCounts::new((i % 400) as u64, (i % 90) as u64))
                    .with_hour(hour)
                    .with_weather(WeatherCondition::from_code((i % 3) as u8 + 1).unwrap())
                    .with_working_day(day % 7 < 5)
                    .with_season(Season::from_code((day / 91 % 4) as u8 + 1).unwrap()),
            );
        }
    }

    RideTable::from_records(Granularity::Hour, records)
}

fn benchmark_daily_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("daily_aggregation");

    // One month and two years of hourly rows
    for days in [31usize, 731] {
        let table = create_hour_table(days);
        group.bench_function(format!("aggregate_{days}_days"), |b| {
            b.iter(|| Aggregator::aggregate_daily(black_box(&table)));
        });
    }

    group.finish();
}

fn benchmark_monthly_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("monthly_aggregation");

    let daily = Aggregator::aggregate_daily(&create_hour_table(731));
    group.bench_function("monthly_by_user_type_731_days", |b| {
        b.iter(|| Aggregator::monthly_by_user_type(black_box(&daily)));
    });

    group.finish();
}

fn benchmark_breakdowns(c: &mut Criterion) {
    let mut group = c.benchmark_group("breakdowns");
    group.sample_size(20);

    let table = create_hour_table(731);
    for kind in [
        BreakdownKind::HourByWeather,
        BreakdownKind::WeekdayByWorkingDay,
        BreakdownKind::SeasonByWorkingDay,
    ] {
        group.bench_function(kind.name(), |b| {
            b.iter(|| kind.run(black_box(&table)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_daily_aggregation,
    benchmark_monthly_aggregation,
    benchmark_breakdowns
);
criterion_main!(benches);
