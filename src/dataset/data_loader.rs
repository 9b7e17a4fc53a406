use crate::dataset::error::DatasetError;
use crate::dataset::frame::{datetime_dtype, sort_by_datetime, Dataset, LoadReport};
use crate::types::metric::{
    Metric, COL_DATETIME, COL_DAY, COL_HOUR, COL_MONTH, COL_STATION, COL_WIND_DIRECTION, COL_YEAR,
};
use crate::types::source::Source;
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Timestamp layouts accepted in the timestamp column of a merged file.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Settings that control how source files are parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Name of the timestamp column in a merged file. Defaults to `datetime`.
    pub timestamp_column: String,
    /// Cell values treated as missing. Defaults to `NA` and the empty string.
    pub null_values: Vec<String>,
    /// Number of rows used to infer the types of columns the loader does not
    /// consume; `None` scans the whole file. Timestamp, station, calendar,
    /// metric and `wd` columns are always read as text and cast afterwards.
    pub infer_schema_length: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timestamp_column: COL_DATETIME.to_string(),
            null_values: vec!["NA".to_string(), String::new()],
            infer_schema_length: Some(10_000),
        }
    }
}

/// Reads CSV sources and normalizes them into a [`Dataset`].
///
/// Loading has no hidden state: the same files and configuration always yield
/// the same dataset. See [`crate::DatasetCache`] for the read-through cache.
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    config: LoaderConfig,
}

impl DatasetLoader {
    pub fn new(config: LoaderConfig) -> DatasetLoader {
        DatasetLoader { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loads a source into a dataset sorted ascending by timestamp.
    ///
    /// Rows whose timestamp cannot be parsed (or whose station is missing) are
    /// dropped and counted in [`Dataset::report`].
    ///
    /// # Errors
    ///
    /// * [`DatasetError::SourceNotFound`] if the file or directory does not exist.
    /// * [`DatasetError::Schema`] if a required column is absent from a source file.
    /// * [`DatasetError::EmptySource`] if a station directory holds no CSV files.
    /// * [`DatasetError::CsvRead`] if a file cannot be parsed as CSV.
    pub fn load(&self, source: &Source) -> Result<Dataset, DatasetError> {
        let files = Self::source_files(source)?;
        let dataset = match source {
            Source::MergedFile(path) => self.load_merged_file(path)?,
            Source::StationDirectory(_) => self.load_station_files(&files)?,
        };

        let report = dataset.report();
        info!(
            "Loaded {} rows from {} ({} files read)",
            dataset.len(),
            source,
            report.files_read
        );
        if report.dropped_rows > 0 {
            warn!(
                "Dropped {} of {} rows from {} with an unparseable timestamp or missing station",
                report.dropped_rows, report.rows_read, source
            );
        }
        Ok(dataset)
    }

    /// Lists the files a load of `source` reads, in processing order.
    pub(crate) fn source_files(source: &Source) -> Result<Vec<PathBuf>, DatasetError> {
        let path = source.path();
        if !path.exists() {
            return Err(DatasetError::SourceNotFound(path.to_path_buf()));
        }

        match source {
            Source::MergedFile(path) => {
                if !path.is_file() {
                    return Err(DatasetError::UnexpectedSourceKind {
                        path: path.clone(),
                        expected: "file",
                    });
                }
                Ok(vec![path.clone()])
            }
            Source::StationDirectory(dir) => {
                if !dir.is_dir() {
                    return Err(DatasetError::UnexpectedSourceKind {
                        path: dir.clone(),
                        expected: "directory",
                    });
                }
                let entries = fs::read_dir(dir).map_err(|e| DatasetError::Io(dir.clone(), e))?;
                let mut files = Vec::new();
                for entry in entries {
                    let path = entry.map_err(|e| DatasetError::Io(dir.clone(), e))?.path();
                    if path.is_file() && is_csv(&path) {
                        files.push(path);
                    }
                }
                if files.is_empty() {
                    return Err(DatasetError::EmptySource(dir.clone()));
                }
                files.sort();
                Ok(files)
            }
        }
    }

    /// Mode (a): one file with a timestamp column.
    fn load_merged_file(&self, path: &Path) -> Result<Dataset, DatasetError> {
        let raw = self.read_csv(path)?;
        let timestamp_column = required_column(&raw, &self.config.timestamp_column, path)?
            .cast(&DataType::String)?;
        let timestamps: Vec<Option<NaiveDateTime>> = timestamp_column
            .str()?
            .into_iter()
            .map(|text| text.and_then(parse_timestamp))
            .collect();

        // Without a station column every row belongs to the station named by the file
        let station = match raw.get_column_index(COL_STATION) {
            Some(_) => None,
            None => Some(station_name(path)),
        };
        let (frame, dropped_rows) = normalize(&raw, timestamps, station.as_deref())?;

        Ok(Dataset::new(
            sort_by_datetime(frame)?,
            LoadReport {
                files_read: 1,
                rows_read: raw.height(),
                dropped_rows,
            },
        ))
    }

    /// Mode (b): one file per station with `year`/`month`/`day` columns.
    fn load_station_files(&self, files: &[PathBuf]) -> Result<Dataset, DatasetError> {
        let mut report = LoadReport::default();
        let mut merged: Option<DataFrame> = None;

        for path in files {
            let raw = self.read_csv(path)?;
            let timestamps = calendar_timestamps(&raw, path)?;
            let (frame, dropped_rows) = normalize(&raw, timestamps, Some(&station_name(path)))?;

            report.files_read += 1;
            report.rows_read += raw.height();
            report.dropped_rows += dropped_rows;

            merged = Some(match merged.take() {
                Some(mut all) => {
                    all.vstack_mut(&frame)?;
                    all
                }
                None => frame,
            });
        }

        // source_files guarantees at least one file
        let merged = merged.unwrap_or_else(DataFrame::empty);
        Ok(Dataset::new(sort_by_datetime(merged)?, report))
    }

    /// Reads a CSV file with every column this loader consumes typed as
    /// `String`. Those columns are cast to their final types in [`normalize`],
    /// where cells that do not parse become missing values instead of failing
    /// the whole file.
    fn read_csv(&self, path: &Path) -> Result<DataFrame, DatasetError> {
        let header = self
            .csv_options(None)
            .with_n_rows(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| DatasetError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        // Only columns present in the header, so no overwrite is applied by position
        let text_columns: Schema = header
            .get_column_names()
            .into_iter()
            .filter(|name| self.is_consumed_column(name.as_str()))
            .map(|name| Field::new(name.clone(), DataType::String))
            .collect();

        self.csv_options(Some(Arc::new(text_columns)))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| DatasetError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })
    }

    fn csv_options(&self, schema_overwrite: Option<SchemaRef>) -> CsvReadOptions {
        let null_values = (!self.config.null_values.is_empty()).then(|| {
            NullValues::AllColumns(
                self.config
                    .null_values
                    .iter()
                    .map(|value| value.as_str().into())
                    .collect(),
            )
        });

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.config.infer_schema_length)
            .with_schema_overwrite(schema_overwrite)
            .map_parse_options(|options| options.with_null_values(null_values.clone()))
    }

    fn is_consumed_column(&self, name: &str) -> bool {
        name == self.config.timestamp_column
            || [COL_STATION, COL_WIND_DIRECTION, COL_YEAR, COL_MONTH, COL_DAY, COL_HOUR]
                .contains(&name)
            || Metric::ALL.iter().any(|metric| metric.column_name() == name)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// The station identifier of a per-station file: its file name without extension.
fn station_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn required_column<'a>(
    frame: &'a DataFrame,
    column: &str,
    path: &Path,
) -> Result<&'a Column, DatasetError> {
    frame.column(column).map_err(|_| DatasetError::Schema {
        source_path: path.to_path_buf(),
        column: column.to_string(),
    })
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Combines the `year`, `month`, `day` and optional `hour` columns into timestamps.
fn calendar_timestamps(
    raw: &DataFrame,
    path: &Path,
) -> Result<Vec<Option<NaiveDateTime>>, DatasetError> {
    let years = int_values(required_column(raw, COL_YEAR, path)?)?;
    let months = int_values(required_column(raw, COL_MONTH, path)?)?;
    let days = int_values(required_column(raw, COL_DAY, path)?)?;
    let hours = match raw.column(COL_HOUR) {
        Ok(column) => int_values(column)?,
        Err(_) => vec![Some(0); raw.height()],
    };

    Ok(years
        .into_iter()
        .zip(months)
        .zip(days)
        .zip(hours)
        .map(|(((year, month), day), hour)| compose_timestamp(year?, month?, day?, hour?))
        .collect())
}

fn int_values(column: &Column) -> PolarsResult<Vec<Option<i64>>> {
    let values = column.cast(&DataType::Int64)?;
    Ok(values.i64()?.into_iter().collect())
}

fn compose_timestamp(year: i64, month: i64, day: i64, hour: i64) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;
    date.and_hms_opt(u32::try_from(hour).ok()?, 0, 0)
}

/// Projects a raw source frame onto the dataset schema and drops rows without
/// a timestamp or station. Returns the frame and the number of dropped rows.
fn normalize(
    raw: &DataFrame,
    timestamps: Vec<Option<NaiveDateTime>>,
    station: Option<&str>,
) -> Result<(DataFrame, usize), DatasetError> {
    let height = raw.height();
    let mut columns = Vec::with_capacity(Metric::ALL.len() + 3);

    columns.push(
        Series::new(COL_DATETIME.into(), timestamps)
            .cast(&datetime_dtype())?
            .into_column(),
    );
    columns.push(match station {
        Some(name) => Series::new(COL_STATION.into(), vec![name; height]).into_column(),
        None => raw.column(COL_STATION)?.cast(&DataType::String)?,
    });
    // Metrics a station does not measure become all-null columns
    for metric in Metric::ALL {
        columns.push(typed_column(raw, metric.column_name(), &DataType::Float64)?);
    }
    columns.push(typed_column(raw, COL_WIND_DIRECTION, &DataType::String)?);

    let frame = DataFrame::new(columns)?
        .lazy()
        .filter(
            col(COL_DATETIME)
                .is_not_null()
                .and(col(COL_STATION).is_not_null()),
        )
        .collect()?;
    let dropped_rows = height - frame.height();
    Ok((frame, dropped_rows))
}

fn typed_column(raw: &DataFrame, name: &str, dtype: &DataType) -> PolarsResult<Column> {
    match raw.column(name) {
        Ok(column) => column.cast(dtype),
        Err(_) => Ok(Series::full_null(name.into(), raw.height(), dtype).into_column()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::reading::Reading;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn station_directory() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "Dongsi.csv",
            &[
                HEADER,
                "1,2013,3,1,2,9,9,3,17,300,89,-0.5,1024.5,-21.4,0,NW,5.7,Dongsi",
                "2,2013,3,1,0,4,4,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,Dongsi",
            ],
        );
        write_file(
            dir.path(),
            "Tiantan.csv",
            &[
                HEADER,
                "1,2013,3,1,1,6,18,5,NA,800,88,-1.1,1023.2,-18.2,0,N,4.7,Tiantan",
                "2,2013,2,30,0,1,1,1,1,1,1,1,1,1,0,N,1,Tiantan",
            ],
        );
        write_file(dir.path(), "notes.txt", &["not a station file"]);
        dir
    }

    #[test]
    fn test_station_directory_is_merged_and_sorted() -> Result<(), DatasetError> {
        let dir = station_directory();
        let dataset = DatasetLoader::default().load(&Source::station_directory(dir.path()))?;

        let readings = dataset.readings()?;
        let rows: Vec<(NaiveDateTime, &str)> = readings
            .iter()
            .map(|r| (r.timestamp, r.station.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                (at(2013, 3, 1, 0), "Dongsi"),
                (at(2013, 3, 1, 1), "Tiantan"),
                (at(2013, 3, 1, 2), "Dongsi"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_invalid_calendar_rows_are_dropped_and_counted() -> Result<(), DatasetError> {
        let dir = station_directory();
        let dataset = DatasetLoader::default().load(&Source::station_directory(dir.path()))?;

        // 2013-02-30 does not exist
        assert_eq!(
            *dataset.report(),
            LoadReport {
                files_read: 2,
                rows_read: 4,
                dropped_rows: 1,
            }
        );
        assert_eq!(dataset.len(), 3);
        Ok(())
    }

    #[test]
    fn test_missing_values_and_wind_direction() -> Result<(), DatasetError> {
        let dir = station_directory();
        let dataset = DatasetLoader::default().load(&Source::station_directory(dir.path()))?;

        let tiantan = dataset
            .readings()?
            .into_iter()
            .find(|r| r.station == "Tiantan")
            .unwrap();
        assert_eq!(tiantan.value(Metric::No2), None);
        assert_eq!(tiantan.value(Metric::Pm10), Some(18.0));
        assert_eq!(tiantan.value(Metric::WindSpeed), Some(4.7));
        assert_eq!(tiantan.wind_direction.as_deref(), Some("N"));
        Ok(())
    }

    #[test]
    fn test_non_numeric_metric_cells_become_missing() -> Result<(), DatasetError> {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "Dongsi.csv",
            &[
                "year,month,day,hour,PM2.5,TEMP",
                "2013,3,1,0,abc,1.5",
                "2013,3,1,1,7,-",
            ],
        );
        let dataset = DatasetLoader::default().load(&Source::station_directory(dir.path()))?;

        assert_eq!(dataset.report().dropped_rows, 0);
        let readings = dataset.readings()?;
        assert_eq!(readings[0].value(Metric::Pm25), None);
        assert_eq!(readings[0].value(Metric::Temperature), Some(1.5));
        assert_eq!(readings[1].value(Metric::Pm25), Some(7.0));
        assert_eq!(readings[1].value(Metric::Temperature), None);
        Ok(())
    }

    #[test]
    fn test_bad_cells_after_inference_window() -> Result<(), DatasetError> {
        let dir = TempDir::new().unwrap();
        let start = at(2013, 3, 1, 0);
        let mut lines = vec!["year,month,day,hour,PM2.5".to_string()];
        for i in 0..10_050 {
            let ts = start + chrono::Duration::hours(i);
            let (year, pm25) = match i {
                10_040 => ("2013".to_string(), "12.5".to_string()),
                10_042 => ("2013".to_string(), "NaN?".to_string()),
                10_044 => ("2O13".to_string(), "3".to_string()),
                _ => (ts.format("%Y").to_string(), (i % 300).to_string()),
            };
            lines.push(format!(
                "{year},{},{},{},{pm25}",
                ts.format("%-m"),
                ts.format("%-d"),
                ts.format("%-H")
            ));
        }
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        write_file(dir.path(), "Dongsi.csv", &lines);

        let dataset = DatasetLoader::default().load(&Source::station_directory(dir.path()))?;

        // The unparseable year drops its row; the metric cells only lose their value
        assert_eq!(dataset.report().dropped_rows, 1);
        assert_eq!(dataset.len(), 10_049);
        let readings = dataset.readings()?;
        let value_at = |hours: i64| {
            readings
                .iter()
                .find(|r| r.timestamp == start + chrono::Duration::hours(hours))
                .map(|r| r.value(Metric::Pm25))
        };
        assert_eq!(value_at(10_040), Some(Some(12.5)));
        assert_eq!(value_at(10_042), Some(None));
        assert_eq!(value_at(10_043), Some(Some(143.0)));
        assert_eq!(value_at(10_044), None);
        Ok(())
    }

    #[test]
    fn test_station_comes_from_file_name() -> Result<(), DatasetError> {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "Gucheng.csv",
            &[HEADER, "1,2013,3,1,0,1,1,1,1,1,1,1,1,1,0,N,1,SomethingElse"],
        );
        let dataset = DatasetLoader::default().load(&Source::station_directory(dir.path()))?;
        assert_eq!(dataset.stations()?, ["Gucheng"]);
        Ok(())
    }

    #[test]
    fn test_hour_column_is_optional() -> Result<(), DatasetError> {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "Wanliu.CSV",
            &["year,month,day,PM2.5", "2014,7,4,55.5"],
        );
        let dataset = DatasetLoader::default().load(&Source::station_directory(dir.path()))?;
        let readings = dataset.readings()?;
        assert_eq!(
            readings,
            [Reading::new(at(2014, 7, 4, 0), "Wanliu").with_value(Metric::Pm25, 55.5)]
        );
        Ok(())
    }

    #[test]
    fn test_missing_calendar_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "Dongsi.csv", &["year,month,PM2.5", "2013,3,4"]);

        let err = DatasetLoader::default()
            .load(&Source::station_directory(dir.path()))
            .unwrap_err();
        match err {
            DatasetError::Schema { column, .. } => assert_eq!(column, "day"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_directory_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = DatasetLoader::default()
            .load(&Source::station_directory(&missing))
            .unwrap_err();
        assert!(matches!(err, DatasetError::SourceNotFound(path) if path == missing));
    }

    #[test]
    fn test_directory_without_csv_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "readme.md", &["nothing here"]);

        let err = DatasetLoader::default()
            .load(&Source::station_directory(dir.path()))
            .unwrap_err();
        assert!(matches!(err, DatasetError::EmptySource(_)));
    }

    #[test]
    fn test_file_given_as_directory() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "Dongsi.csv", &["year,month,day", "2013,3,1"]);

        let err = DatasetLoader::default()
            .load(&Source::station_directory(&path))
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::UnexpectedSourceKind {
                expected: "directory",
                ..
            }
        ));
    }

    #[test]
    fn test_merged_file() -> Result<(), DatasetError> {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "all_data.csv",
            &[
                "datetime,station,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,WSPM,wd",
                "2013-06-20 12:00:00,Tiantan,80,100,5,40,900,120,31.5,1.2,SE",
                "2013-03-15 00:00:00,Dongsi,10,20,8,30,500,60,8.0,2.0,N",
                "not a date,Dongsi,1,1,1,1,1,1,1,1,N",
                "2013-03-15,Tiantan,NA,NA,NA,NA,NA,NA,NA,NA,NA",
            ],
        );
        let dataset = DatasetLoader::default().load(&Source::merged_file(&path))?;

        assert_eq!(dataset.report().dropped_rows, 1);
        assert_eq!(dataset.report().rows_read, 4);
        let readings = dataset.readings()?;
        assert_eq!(
            readings,
            [
                Reading::new(at(2013, 3, 15, 0), "Dongsi")
                    .with_value(Metric::Pm25, 10.0)
                    .with_value(Metric::Pm10, 20.0)
                    .with_value(Metric::So2, 8.0)
                    .with_value(Metric::No2, 30.0)
                    .with_value(Metric::Co, 500.0)
                    .with_value(Metric::O3, 60.0)
                    .with_value(Metric::Temperature, 8.0)
                    .with_value(Metric::WindSpeed, 2.0)
                    .with_wind_direction("N"),
                Reading::new(at(2013, 3, 15, 0), "Tiantan"),
                Reading::new(at(2013, 6, 20, 12), "Tiantan")
                    .with_value(Metric::Pm25, 80.0)
                    .with_value(Metric::Pm10, 100.0)
                    .with_value(Metric::So2, 5.0)
                    .with_value(Metric::No2, 40.0)
                    .with_value(Metric::Co, 900.0)
                    .with_value(Metric::O3, 120.0)
                    .with_value(Metric::Temperature, 31.5)
                    .with_value(Metric::WindSpeed, 1.2)
                    .with_wind_direction("SE"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_merged_file_without_station_column_uses_file_name() -> Result<(), DatasetError> {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "Shunyi.csv",
            &["datetime,PM2.5", "2016-01-01T05:00:00,120"],
        );
        let dataset = DatasetLoader::default().load(&Source::merged_file(&path))?;
        assert_eq!(dataset.stations()?, ["Shunyi"]);
        Ok(())
    }

    #[test]
    fn test_custom_timestamp_column() -> Result<(), DatasetError> {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "all_data.csv",
            &["waktu,station,PM2.5", "2016-01-01 05:00,Dongsi,120"],
        );
        let loader = DatasetLoader::new(LoaderConfig {
            timestamp_column: "waktu".to_string(),
            ..LoaderConfig::default()
        });
        let dataset = loader.load(&Source::merged_file(&path))?;
        assert_eq!(dataset.readings()?[0].timestamp, at(2016, 1, 1, 5));

        let err = DatasetLoader::default()
            .load(&Source::merged_file(&path))
            .unwrap_err();
        assert!(matches!(err, DatasetError::Schema { column, .. } if column == "datetime"));
        Ok(())
    }

    #[test]
    fn test_missing_merged_file() {
        let dir = TempDir::new().unwrap();
        let err = DatasetLoader::default()
            .load(&Source::merged_file(dir.path().join("all_data.csv")))
            .unwrap_err();
        assert!(matches!(err, DatasetError::SourceNotFound(_)));
    }

    #[test]
    fn test_loading_twice_is_identical() -> Result<(), DatasetError> {
        let dir = station_directory();
        let loader = DatasetLoader::default();
        let source = Source::station_directory(dir.path());

        let first = loader.load(&source)?;
        let second = loader.load(&source)?;
        assert!(first.frame().equals_missing(second.frame()));
        assert_eq!(first.report(), second.report());
        Ok(())
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2013-03-01 04:00:00"), Some(at(2013, 3, 1, 4)));
        assert_eq!(parse_timestamp("2013-03-01T04:00:00"), Some(at(2013, 3, 1, 4)));
        assert_eq!(parse_timestamp(" 2013-03-01 04:00 "), Some(at(2013, 3, 1, 4)));
        assert_eq!(parse_timestamp("2013/03/01 04:00:00"), Some(at(2013, 3, 1, 4)));
        assert_eq!(parse_timestamp("2013-03-01"), Some(at(2013, 3, 1, 0)));
        assert_eq!(parse_timestamp("01-03-2013"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
