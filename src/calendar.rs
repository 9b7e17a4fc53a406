//! Derives the calendar features (`year`, `month`, `season`) every grouped view
//! is built on. Features are always recomputed from `datetime`; loaded and cached
//! datasets never carry them.

use crate::dataset::error::DatasetError;
use crate::dataset::frame::{timestamps, Dataset};
use crate::types::metric::{COL_MONTH, COL_SEASON, COL_YEAR};
use crate::types::season::Season;
use chrono::Datelike;
use polars::prelude::*;

/// Returns a copy of `dataset` with `year` (Int32), `month` (Int32, 1-12) and
/// `season` (String) columns added, overwriting any existing ones.
///
/// Applying it twice yields the same frame as applying it once.
pub fn derive_calendar_features(dataset: &Dataset) -> Result<Dataset, DatasetError> {
    let frame = with_calendar_columns(dataset.frame().clone())?;
    Ok(Dataset::new(frame, *dataset.report()))
}

impl Dataset {
    /// See [`derive_calendar_features`].
    pub fn with_calendar_features(&self) -> Result<Dataset, DatasetError> {
        derive_calendar_features(self)
    }
}

pub(crate) fn with_calendar_columns(mut frame: DataFrame) -> PolarsResult<DataFrame> {
    let timestamps = timestamps(&frame)?;

    let years: Vec<Option<i32>> = timestamps.iter().map(|ts| ts.map(|ts| ts.year())).collect();
    let months: Vec<Option<i32>> = timestamps
        .iter()
        .map(|ts| ts.and_then(|ts| i32::try_from(ts.month()).ok()))
        .collect();
    let seasons: Vec<Option<&str>> = timestamps
        .iter()
        .map(|ts| ts.and_then(|ts| Season::from_month(ts.month())).map(Season::name))
        .collect();

    frame.with_column(Series::new(COL_YEAR.into(), years))?;
    frame.with_column(Series::new(COL_MONTH.into(), months))?;
    frame.with_column(Series::new(COL_SEASON.into(), seasons))?;
    Ok(frame)
}
