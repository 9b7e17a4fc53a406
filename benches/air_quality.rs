use airquality::{Dataset, GroupKey, Metric, Reading, Reducer};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_dataset() -> Dataset {
    let start = NaiveDate::from_ymd_opt(2013, 3, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap();
    let stations = ["Aotizhongxin", "Dongsi", "Tiantan", "Wanliu"];
    let readings: Vec<Reading> = (0..24 * 365)
        .flat_map(|hour| {
            stations.iter().enumerate().map(move |(i, station)| {
                let x = (hour as f64 / 24.0).sin() * 50.0 + 80.0 + i as f64;
                Reading::new(start + Duration::hours(hour), station)
                    .with_value(Metric::Pm25, x)
                    .with_value(Metric::Pm10, x * 1.3)
                    .with_value(Metric::Temperature, 30.0 - x / 10.0)
            })
        })
        .collect();
    Dataset::from_readings(&readings).unwrap()
}

fn bench_queries(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let view = dataset.view();

    c.bench_function("aggregate_season", |b| {
        b.iter(|| view.aggregate(black_box(GroupKey::Season), Metric::Pm25, Reducer::Mean))
    });
    c.bench_function("filter_station", |b| {
        b.iter(|| dataset.filter().station(black_box("Dongsi")).call().map(|v| v.count()))
    });
    c.bench_function("correlation_matrix", |b| {
        b.iter(|| {
            view.correlation_matrix(black_box(&[Metric::Pm25, Metric::Pm10, Metric::Temperature]))
        })
    });
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
