//! Contains the `Dataset` structure: the immutable, chronologically ordered table
//! of readings every query runs against.

use crate::dataset::error::DatasetError;
use crate::filtering::FilteredView;
use crate::types::metric::{Metric, COL_DATETIME, COL_STATION, COL_WIND_DIRECTION};
use crate::types::reading::Reading;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeSet;

/// Summary of what a load read and what it had to discard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of source files read.
    pub files_read: usize,
    /// Number of data rows found in the source files.
    pub rows_read: usize,
    /// Rows dropped because their timestamp could not be parsed or their
    /// station was missing.
    pub dropped_rows: usize,
}

/// An immutable table of air-quality readings, sorted ascending by timestamp.
///
/// The underlying `DataFrame` always has the same schema:
///
/// * `datetime`: `Datetime(ms)`, never null
/// * `station`: `String`, never null
/// * one `Float64` column per [`Metric`] (`PM2.5`, `PM10`, `SO2`, `NO2`, `CO`, `O3`, `TEMP`, `WSPM`)
/// * `wd`: `String`, wind direction code
///
/// Cloning a `Dataset` is cheap; the column buffers are shared.
///
/// Datasets are produced by [`crate::DatasetLoader::load`] (or the cached
/// [`crate::AirQuality::load`]) and by [`Dataset::from_readings`].
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    report: LoadReport,
}

impl Dataset {
    /// Wraps an already normalized and sorted frame.
    pub(crate) fn new(frame: DataFrame, report: LoadReport) -> Self {
        Self { frame, report }
    }

    /// Builds a dataset from in-memory readings.
    ///
    /// The readings do not need to be ordered; the resulting dataset is sorted
    /// by timestamp (stable, so readings with equal timestamps keep their order).
    ///
    /// # Examples
    ///
    /// ```
    /// use airquality::{Dataset, Metric, Reading};
    /// use chrono::NaiveDate;
    ///
    /// let at = |d| NaiveDate::from_ymd_opt(2013, 3, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
    /// let dataset = Dataset::from_readings(&[
    ///     Reading::new(at(2), "Dongsi").with_value(Metric::Pm25, 12.0),
    ///     Reading::new(at(1), "Dongsi").with_value(Metric::Pm25, 4.0),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(dataset.len(), 2);
    /// assert_eq!(dataset.readings().unwrap()[0].value(Metric::Pm25), Some(4.0));
    /// ```
    pub fn from_readings(readings: &[Reading]) -> Result<Self, DatasetError> {
        let timestamps: Vec<NaiveDateTime> = readings.iter().map(|r| r.timestamp).collect();
        let stations: Vec<&str> = readings.iter().map(|r| r.station.as_str()).collect();

        let mut columns = Vec::with_capacity(Metric::ALL.len() + 3);
        columns.push(
            Series::new(COL_DATETIME.into(), timestamps)
                .cast(&datetime_dtype())?
                .into_column(),
        );
        columns.push(Series::new(COL_STATION.into(), stations).into_column());
        for metric in Metric::ALL {
            let values: Vec<Option<f64>> = readings.iter().map(|r| r.value(metric)).collect();
            columns.push(Series::new(metric.column_name().into(), values).into_column());
        }
        let wind_directions: Vec<Option<&str>> = readings
            .iter()
            .map(|r| r.wind_direction.as_deref())
            .collect();
        columns.push(Series::new(COL_WIND_DIRECTION.into(), wind_directions).into_column());

        let frame = sort_by_datetime(DataFrame::new(columns)?)?;
        Ok(Self::new(frame, LoadReport::default()))
    }

    /// Collects every row back into [`Reading`]s, in timestamp order.
    pub fn readings(&self) -> Result<Vec<Reading>, DatasetError> {
        let timestamps = timestamps(&self.frame)?;
        let stations = self.frame.column(COL_STATION)?.str()?;
        let wind_directions = self.frame.column(COL_WIND_DIRECTION)?.str()?;
        let metric_columns = Metric::ALL
            .iter()
            .map(|metric| Ok((*metric, self.frame.column(metric.column_name())?.f64()?)))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut readings = Vec::with_capacity(self.frame.height());
        for (idx, timestamp) in timestamps.into_iter().enumerate() {
            // Loaded frames never contain null timestamps or stations
            let (Some(timestamp), Some(station)) = (timestamp, stations.get(idx)) else {
                continue;
            };
            let mut reading = Reading::new(timestamp, station);
            for (metric, values) in &metric_columns {
                if let Some(value) = values.get(idx) {
                    reading.values.insert(*metric, value);
                }
            }
            reading.wind_direction = wind_directions.get(idx).map(str::to_string);
            readings.push(reading);
        }
        Ok(readings)
    }

    /// The underlying polars frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// A `LazyFrame` over the dataset, for ad-hoc polars queries.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// An unfiltered view over every row.
    pub fn view(&self) -> FilteredView {
        FilteredView::new(self.lazy())
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// The distinct station identifiers, sorted.
    pub fn stations(&self) -> Result<Vec<String>, DatasetError> {
        let stations: BTreeSet<&str> = self
            .frame
            .column(COL_STATION)?
            .str()?
            .into_iter()
            .flatten()
            .collect();
        Ok(stations.into_iter().map(str::to_string).collect())
    }

    /// The dates of the first and last reading, or `None` for an empty dataset.
    ///
    /// This is the default date range a caller offers before the user narrows it.
    pub fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, DatasetError> {
        let timestamps = timestamps(&self.frame)?;
        let mut present = timestamps.into_iter().flatten();
        let Some(first) = present.next() else {
            return Ok(None);
        };
        let last = present.last().unwrap_or(first);
        Ok(Some((first.date(), last.date())))
    }
}

pub(crate) fn datetime_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

/// Reads the `datetime` column as `NaiveDateTime`s.
pub(crate) fn timestamps(frame: &DataFrame) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    let millis = frame
        .column(COL_DATETIME)?
        .cast(&datetime_dtype())?
        .cast(&DataType::Int64)?;
    Ok(millis
        .i64()?
        .into_iter()
        .map(|ms| ms.and_then(naive_from_millis))
        .collect())
}

fn naive_from_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// Stable sort on `datetime`; rows with equal timestamps keep their order.
pub(crate) fn sort_by_datetime(frame: DataFrame) -> PolarsResult<DataFrame> {
    frame.sort(
        [COL_DATETIME],
        SortMultipleOptions::default().with_maintain_order(true),
    )
}
