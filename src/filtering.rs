//! Contains `FilteredView`, a lazy selection of dataset rows by station and date.

use crate::analysis::aggregate::{aggregate, GroupKey, OrderedSeries, Reducer};
use crate::analysis::correlation::{correlation_matrix, CorrelationMatrix};
use crate::analysis::error::QueryError;
use crate::dataset::frame::Dataset;
use crate::types::metric::{Metric, COL_DATETIME, COL_STATION};
use bon::bon;
use chrono::NaiveDate;
use polars::prelude::{col, lit, DataFrame, DataType, Expr, LazyFrame};

/// A read-only selection over a [`Dataset`].
///
/// The view is a polars `LazyFrame` plan over the dataset's columns: it stores
/// no rows of its own, and nothing is computed until a query collects it.
/// Filtering preserves the dataset's chronological order and never modifies the
/// dataset.
///
/// Instances are obtained via [`Dataset::filter`] or [`Dataset::view`].
#[derive(Clone)]
pub struct FilteredView {
    /// The underlying polars plan.
    pub frame: LazyFrame,
}

impl FilteredView {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Narrows the view with an arbitrary polars predicate.
    ///
    /// ```
    /// # use airquality::{Dataset, Metric, Reading};
    /// use polars::prelude::{col, lit};
    /// # use chrono::NaiveDate;
    /// # let at = NaiveDate::from_ymd_opt(2013, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    /// # let dataset = Dataset::from_readings(&[
    /// #     Reading::new(at, "Dongsi").with_value(Metric::Pm25, 180.0),
    /// #     Reading::new(at, "Tiantan").with_value(Metric::Pm25, 20.0),
    /// # ]).unwrap();
    /// let polluted = dataset.view().filter(col("PM2.5").gt(lit(150.0)));
    /// assert_eq!(polluted.count().unwrap(), 1);
    /// ```
    pub fn filter(&self, predicate: Expr) -> FilteredView {
        FilteredView::new(self.frame.clone().filter(predicate))
    }

    /// Keeps only the rows of one station (exact match).
    pub fn station(&self, station: &str) -> FilteredView {
        self.filter(col(COL_STATION).eq(lit(station)))
    }

    /// Keeps the rows whose date (time of day ignored) lies in `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidRange`] if `start` is after `end`.
    pub fn get_range(&self, start: NaiveDate, end: NaiveDate) -> Result<FilteredView, QueryError> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }
        Ok(self.since(start).until(end))
    }

    fn since(&self, start: NaiveDate) -> FilteredView {
        self.filter(col(COL_DATETIME).cast(DataType::Date).gt_eq(lit(start)))
    }

    fn until(&self, end: NaiveDate) -> FilteredView {
        self.filter(col(COL_DATETIME).cast(DataType::Date).lt_eq(lit(end)))
    }

    /// Materializes the selected rows.
    pub fn collect(&self) -> Result<DataFrame, QueryError> {
        Ok(self.frame.clone().collect()?)
    }

    /// Number of selected rows. An empty view is a valid result.
    pub fn count(&self) -> Result<usize, QueryError> {
        Ok(self.collect()?.height())
    }

    /// The `datetime`, `station` and requested metric columns of the selected
    /// rows, in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidArgument`] if `metrics` is empty.
    pub fn time_series(&self, metrics: &[Metric]) -> Result<DataFrame, QueryError> {
        if metrics.is_empty() {
            return Err(QueryError::InvalidArgument(
                "time series needs at least one metric".to_string(),
            ));
        }
        let mut columns = vec![col(COL_DATETIME), col(COL_STATION)];
        columns.extend(metrics.iter().map(|metric| col(metric.column_name())));
        Ok(self.frame.clone().select(columns).collect()?)
    }

    /// See [`aggregate`].
    pub fn aggregate(
        &self,
        group_key: GroupKey,
        metric: Metric,
        reducer: Reducer,
    ) -> Result<OrderedSeries, QueryError> {
        aggregate(self, group_key, metric, reducer)
    }

    /// See [`correlation_matrix`].
    pub fn correlation_matrix(&self, metrics: &[Metric]) -> Result<CorrelationMatrix, QueryError> {
        correlation_matrix(self, metrics)
    }
}

#[bon]
impl Dataset {
    /// Selects rows by station and/or date range.
    ///
    /// This method uses a builder pattern; every argument is optional and an
    /// omitted argument does not constrain the selection.
    ///
    /// # Arguments
    ///
    /// * `.station(&str)`: Exact match on the station identifier.
    /// * `.start(NaiveDate)`: First date to include (inclusive).
    /// * `.end(NaiveDate)`: Last date to include (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidRange`] if both bounds are given and `start`
    /// is after `end`. An empty selection is not an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use airquality::{Dataset, QueryError, Reading};
    /// use chrono::NaiveDate;
    ///
    /// let day = |d| NaiveDate::from_ymd_opt(2013, 3, d).unwrap();
    /// let dataset = Dataset::from_readings(&[
    ///     Reading::new(day(1).and_hms_opt(8, 0, 0).unwrap(), "Dongsi"),
    ///     Reading::new(day(2).and_hms_opt(23, 0, 0).unwrap(), "Dongsi"),
    ///     Reading::new(day(2).and_hms_opt(9, 0, 0).unwrap(), "Tiantan"),
    /// ])
    /// .unwrap();
    ///
    /// let view = dataset.filter().station("Dongsi").start(day(2)).end(day(2)).call().unwrap();
    /// assert_eq!(view.count().unwrap(), 1);
    ///
    /// let reversed = dataset.filter().start(day(2)).end(day(1)).call();
    /// assert!(matches!(reversed, Err(QueryError::InvalidRange { .. })));
    /// ```
    #[builder]
    pub fn filter(
        &self,
        station: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<FilteredView, QueryError> {
        let mut view = self.view();
        match (start, end) {
            (Some(start), Some(end)) => view = view.get_range(start, end)?,
            (Some(start), None) => view = view.since(start),
            (None, Some(end)) => view = view.until(end),
            (None, None) => {}
        }
        if let Some(station) = station {
            view = view.station(station);
        }
        Ok(view)
    }
}
