use crate::analysis::error::QueryError;
use crate::filtering::FilteredView;
use crate::types::metric::Metric;
use log::debug;
use polars::prelude::{col, len, pearson_corr, DataFrame, DataType, Expr, IntoLazy, PolarsResult};
use serde::Serialize;
use std::collections::HashSet;

const COL_PAIRS: &str = "pairs";
const COL_R: &str = "r";

/// Symmetric matrix of pairwise Pearson coefficients between metrics.
///
/// Row and column `i` both belong to `metrics()[i]`. An entry is `None` when
/// the coefficient is undefined for that pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    metrics: Vec<Metric>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Rows of the matrix, in `metrics()` order.
    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    /// The coefficient between `a` and `b`, or `None` if either metric is not
    /// part of the matrix or the coefficient is undefined.
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        let row = self.metrics.iter().position(|m| *m == a)?;
        let col = self.metrics.iter().position(|m| *m == b)?;
        self.values[row][col]
    }
}

/// Computes the Pearson correlation between every pair of `metrics` over the
/// rows of `view`.
///
/// Each pair uses only the rows where both metrics have a value. An
/// off-diagonal entry is `None` with fewer than two such rows or when either
/// side is constant. A diagonal entry is `1.0` for every metric with at least
/// one value.
///
/// # Errors
///
/// Returns [`QueryError::InvalidArgument`] with fewer than two metrics or when
/// a metric is listed twice.
///
/// # Examples
///
/// ```
/// use airquality::{correlation_matrix, Dataset, Metric, Reading};
/// use chrono::NaiveDate;
///
/// let at = |h| NaiveDate::from_ymd_opt(2013, 3, 1).unwrap().and_hms_opt(h, 0, 0).unwrap();
/// let dataset = Dataset::from_readings(&[
///     Reading::new(at(0), "Dongsi").with_value(Metric::Pm25, 10.0).with_value(Metric::Pm10, 20.0),
///     Reading::new(at(1), "Dongsi").with_value(Metric::Pm25, 20.0).with_value(Metric::Pm10, 40.0),
///     Reading::new(at(2), "Dongsi").with_value(Metric::Pm25, 30.0).with_value(Metric::Pm10, 60.0),
/// ])
/// .unwrap();
///
/// let matrix = correlation_matrix(&dataset.view(), &[Metric::Pm25, Metric::Pm10]).unwrap();
/// assert!((matrix.get(Metric::Pm25, Metric::Pm10).unwrap() - 1.0).abs() < 1e-12);
/// assert!(correlation_matrix(&dataset.view(), &[Metric::Pm25]).is_err());
/// ```
pub fn correlation_matrix(
    view: &FilteredView,
    metrics: &[Metric],
) -> Result<CorrelationMatrix, QueryError> {
    if metrics.len() < 2 {
        return Err(QueryError::InvalidArgument(format!(
            "correlation needs at least two metrics, got {}",
            metrics.len()
        )));
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = metrics.iter().find(|metric| !seen.insert(**metric)) {
        return Err(QueryError::InvalidArgument(format!(
            "metric {duplicate} is listed more than once"
        )));
    }

    let frame = view.collect()?;
    for metric in metrics {
        let name = metric.column_name();
        frame
            .column(name)
            .map_err(|e| QueryError::ColumnNotFound(name.to_string(), e))?;
    }
    debug!(
        "Correlating {} metrics over {} rows",
        metrics.len(),
        frame.height()
    );

    let n = metrics.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = has_values(&frame, metrics[i])?.then_some(1.0);
        for j in (i + 1)..n {
            let r = pearson(&frame, metrics[i], metrics[j])?;
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        metrics: metrics.to_vec(),
        values,
    })
}

fn has_values(frame: &DataFrame, metric: Metric) -> PolarsResult<bool> {
    let column = frame.column(metric.column_name())?;
    Ok(column.null_count() < column.len())
}

fn metric_expr(metric: Metric) -> Expr {
    col(metric.column_name()).cast(DataType::Float64)
}

/// Pearson coefficient over the rows where both metrics have a finite value.
fn pearson(frame: &DataFrame, a: Metric, b: Metric) -> PolarsResult<Option<f64>> {
    let result = frame
        .clone()
        .lazy()
        .filter(metric_expr(a).is_finite().and(metric_expr(b).is_finite()))
        .select([
            len().cast(DataType::Int64).alias(COL_PAIRS),
            pearson_corr(metric_expr(a), metric_expr(b)).alias(COL_R),
        ])
        .collect()?;

    let pairs = result.column(COL_PAIRS)?.i64()?.get(0).unwrap_or(0);
    if pairs < 2 {
        return Ok(None);
    }
    // A constant side yields NaN
    let r = result.column(COL_R)?.cast(&DataType::Float64)?.f64()?.get(0);
    Ok(r.filter(|r| r.is_finite()).map(|r| r.clamp(-1.0, 1.0)))
}
