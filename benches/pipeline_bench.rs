//! Benchmarks for the dashboard data pipeline
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use covidboard::data::*;
use covidboard::pipeline::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::collections::BTreeMap;

fn create_records(regions: usize, days: usize) -> Vec<RawRecord> {
    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    (0..regions)
        .map(|r| {
            (0..days).fold(
                RawRecord::new("open-JHU", "Illinois", format!("{}", 17001 + r * 2)),
                |record, d| {
                    let date = (start + Duration::days(d as i64)).format("%Y-%m-%d").to_string();
                    record.observation(date, (r * d) as f64, d as f64)
                },
            )
        })
        .collect()
}

fn create_geometry(regions: usize) -> RegionCollection {
    RegionCollection::new(
        (0..regions)
            .map(|r| {
                RegionFeature::new(
                    RegionProperties::new(format!("{}", 17001 + r * 2)).scope("Illinois"),
                )
            })
            .collect(),
    )
}

fn bench_map_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_view");

    for regions in [10, 102, 1000] {
        let records = create_records(regions, 120);
        let geometry = create_geometry(regions);
        let ctx = QueryContext::default();
        let now = chrono::Utc::now();

        group.throughput(Throughput::Elements(regions as u64));
        group.bench_function(format!("snapshot_annotate_{}", regions), |b| {
            b.iter(|| map_view(black_box(&records), black_box(&geometry), &ctx, now))
        });

        let annotated = map_view(&records, &geometry, &ctx, now).annotated;
        group.bench_function(format!("totals_{}", regions), |b| {
            b.iter(|| aggregate_totals(black_box(&annotated), "Illinois"))
        });
    }

    group.finish();
}

fn bench_format_series(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let data: BTreeMap<String, DailyCounts> = (0..365)
        .map(|d| {
            let date = (start + Duration::days(d)).format("%Y-%m-%d").to_string();
            let confirmed = if d % 7 == 0 {
                MetricValue::Placeholder("<5".to_string())
            } else {
                MetricValue::Count(d as f64)
            };
            (
                date,
                DailyCounts {
                    confirmed,
                    deaths: MetricValue::Count(1.0),
                    recovered: MetricValue::Missing,
                },
            )
        })
        .collect();
    let series = SelectedLocationSeries { title: None, data };

    c.bench_function("format_series_365", |b| {
        b.iter(|| format_series(black_box(&series)))
    });
}

criterion_group!(benches, bench_map_view, bench_format_series);
criterion_main!(benches);
