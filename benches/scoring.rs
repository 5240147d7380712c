use bikestat::{
    aggregation_types::{RfmGroup, RfmRow},
    grouping::{GroupKey, KeyValue},
    rfm::{RfmGroupBy, RfmScorer, assign_scores},
    table::{Granularity, RideRecord, RideTable},
    types::RideCounts,
};
use chrono::NaiveDate;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn create_hour_table(days: usize) -> RideTable {
    let start = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
    let records = (0..days * 24)
        .map(|i| {
            let date = start + chrono::Duration::days((i / 24) as i64);
            RideRecord::new(date, RideCounts::new((i * 7 % 500) as u64, (i % 60) as u64))
                .with_hour((i % 24) as u8)
        })
        .collect();
    RideTable::from_records(Granularity::Hour, records)
}

fn benchmark_rfm(c: &mut Criterion) {
    let mut group = c.benchmark_group("rfm");

    let table = create_hour_table(731);
    for group_by in [RfmGroupBy::Key(GroupKey::Hour), RfmGroupBy::UserType] {
        let scorer = RfmScorer::new(group_by);
        group.bench_function(format!("run_by_{group_by}"), |b| {
            b.iter(|| scorer.run(black_box(&table)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_quintile_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("quintile_scoring");

    let rows: Vec<RfmRow> = (0..1000u64)
        .map(|i| RfmRow {
            group: RfmGroup::Key(KeyValue::Hour((i % 24) as u8)),
            recency: (i * 31 % 97) as i64,
            frequency: (i * 17 % 200) as usize + 1,
            monetary: i * 13 % 10_007,
            scores: None,
        })
        .collect();

    group.bench_function("assign_scores_1000_rows", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut rows| assign_scores(black_box(&mut rows)).unwrap(),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, benchmark_rfm, benchmark_quintile_scoring);
criterion_main!(benches);
