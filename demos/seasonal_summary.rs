use airquality::{AirQuality, AirQualityError, GroupKey, Metric, Reducer, Source};
use std::env;
use std::path::Path;

fn main() -> Result<(), AirQualityError> {
    env_logger::init();
    configure_polars_display();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/PRSA_Data_20130301-20170228".to_string());
    let source = if Path::new(&path).is_dir() {
        Source::station_directory(&path)
    } else {
        Source::merged_file(&path)
    };

    let client = AirQuality::default();
    let dataset = client.load(&source).call()?;
    println!(
        "Loaded {} rows for {} stations ({} rows dropped)",
        dataset.len(),
        dataset.stations()?.len(),
        dataset.report().dropped_rows
    );

    let view = dataset.filter().call()?;
    let seasonal = view.aggregate(GroupKey::Season, Metric::Pm25, Reducer::Mean)?;
    for point in &seasonal.points {
        match point.value {
            Some(mean) => println!("{:>8}: {:.1}", point.label, mean),
            None => println!("{:>8}: no data", point.label),
        }
    }

    let metrics = [Metric::Pm25, Metric::Pm10, Metric::No2, Metric::Temperature];
    let matrix = view.correlation_matrix(&metrics)?;
    for (metric, row) in matrix.metrics().iter().zip(matrix.values()) {
        let cells: Vec<String> = row
            .iter()
            .map(|r| r.map_or("   -  ".to_string(), |r| format!("{r:>6.2}")))
            .collect();
        println!("{:>6} {}", metric, cells.join(" "));
    }

    println!("{}", view.time_series(&[Metric::Pm25, Metric::O3])?);
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
