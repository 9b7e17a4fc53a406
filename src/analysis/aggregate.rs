//! Grouped reductions of one metric over a [`FilteredView`], returned in the
//! fixed order each grouping key prescribes.

use crate::analysis::error::QueryError;
use crate::calendar::with_calendar_columns;
use crate::filtering::FilteredView;
use crate::types::metric::{Metric, COL_MONTH, COL_SEASON, COL_STATION, COL_WIND_DIRECTION, COL_YEAR};
use crate::types::season::Season;
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const COL_VALUE: &str = "value";

/// The column a view is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupKey {
    Year,
    Month,
    Season,
    Station,
    /// The `wd` compass code. Rows without a direction are left out.
    WindDirection,
}

impl GroupKey {
    fn column_name(self) -> &'static str {
        match self {
            GroupKey::Year => COL_YEAR,
            GroupKey::Month => COL_MONTH,
            GroupKey::Season => COL_SEASON,
            GroupKey::Station => COL_STATION,
            GroupKey::WindDirection => COL_WIND_DIRECTION,
        }
    }

    fn is_calendar(self) -> bool {
        matches!(self, GroupKey::Year | GroupKey::Month | GroupKey::Season)
    }
}

impl FromStr for GroupKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" => Ok(GroupKey::Year),
            "month" => Ok(GroupKey::Month),
            "season" => Ok(GroupKey::Season),
            "station" => Ok(GroupKey::Station),
            "wd" | "wind_direction" => Ok(GroupKey::WindDirection),
            _ => Err(QueryError::InvalidArgument(format!(
                "unknown group key '{s}'"
            ))),
        }
    }
}

/// How the metric values of one group are reduced to a single number.
///
/// Every reducer ignores missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Reducer {
    #[default]
    Mean,
    Median,
    Min,
    Max,
    /// Number of non-missing values.
    Count,
}

impl Reducer {
    fn apply(self, values: Expr) -> Expr {
        let reduced = match self {
            Reducer::Mean => values.mean(),
            Reducer::Median => values.median(),
            Reducer::Min => values.min(),
            Reducer::Max => values.max(),
            Reducer::Count => values.count(),
        };
        reduced.cast(DataType::Float64)
    }

    /// The value reported for a group that has no rows at all.
    fn empty_value(self) -> Option<f64> {
        match self {
            Reducer::Count => Some(0.0),
            _ => None,
        }
    }
}

/// The label of one group in an [`OrderedSeries`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupLabel {
    Year(i32),
    Month(u32),
    Season(Season),
    Station(String),
    WindDirection(String),
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::Year(year) => write!(f, "{year}"),
            GroupLabel::Month(month) => write!(f, "{month}"),
            GroupLabel::Season(season) => write!(f, "{season}"),
            GroupLabel::Station(name) | GroupLabel::WindDirection(name) => f.write_str(name),
        }
    }
}

/// One group of an [`OrderedSeries`]. `value` is `None` when the group has no
/// non-missing value to reduce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: GroupLabel,
    pub value: Option<f64>,
}

/// The result of [`aggregate`]: one point per group, in the key's fixed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedSeries {
    pub group_key: GroupKey,
    pub metric: Metric,
    pub reducer: Reducer,
    pub points: Vec<SeriesPoint>,
}

impl OrderedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The value of the group labelled `label`, if that group exists and has one.
    pub fn get(&self, label: &GroupLabel) -> Option<f64> {
        self.points
            .iter()
            .find(|point| &point.label == label)
            .and_then(|point| point.value)
    }

    pub fn labels(&self) -> impl Iterator<Item = &GroupLabel> {
        self.points.iter().map(|point| &point.label)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.points.iter().map(|point| point.value)
    }
}

/// Groups the rows of `view` by `group_key` and reduces `metric` within each
/// group.
///
/// Ordering of the result:
///
/// * `Season`: always exactly four points, Winter, Spring, Summer, Autumn. A
///   season without data is present with `value: None`.
/// * `Year`, `Month`: ascending numeric.
/// * `Station`, `WindDirection`: ascending lexical.
///
/// Missing metric values are excluded from the reduction, never counted as zero.
///
/// # Examples
///
/// ```
/// use airquality::{aggregate, Dataset, GroupKey, GroupLabel, Metric, Reading, Reducer, Season};
/// use chrono::NaiveDate;
///
/// let at = |m, d| NaiveDate::from_ymd_opt(2013, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let dataset = Dataset::from_readings(&[
///     Reading::new(at(3, 15), "Dongsi").with_value(Metric::Pm25, 80.0),
///     Reading::new(at(4, 2), "Dongsi").with_value(Metric::Pm25, 40.0),
///     Reading::new(at(6, 20), "Dongsi").with_value(Metric::Pm25, 35.0),
/// ])
/// .unwrap();
///
/// let series = aggregate(&dataset.view(), GroupKey::Season, Metric::Pm25, Reducer::Mean).unwrap();
/// assert_eq!(series.len(), 4);
/// assert_eq!(series.get(&GroupLabel::Season(Season::Spring)), Some(60.0));
/// assert_eq!(series.get(&GroupLabel::Season(Season::Winter)), None);
/// ```
pub fn aggregate(
    view: &FilteredView,
    group_key: GroupKey,
    metric: Metric,
    reducer: Reducer,
) -> Result<OrderedSeries, QueryError> {
    let mut frame = view.collect()?;
    frame
        .column(metric.column_name())
        .map_err(|e| QueryError::ColumnNotFound(metric.column_name().to_string(), e))?;
    if group_key.is_calendar() {
        frame = with_calendar_columns(frame)?;
    }

    let key = group_key.column_name();
    let grouped = frame
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg([reducer.apply(col(metric.column_name())).alias(COL_VALUE)])
        .collect()?;
    debug!(
        "Aggregated {} by {:?} into {} groups",
        metric,
        group_key,
        grouped.height()
    );

    let values: Vec<Option<f64>> = grouped
        .column(COL_VALUE)?
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .collect();
    let labels = group_labels(&grouped, group_key)?;

    let mut groups: BTreeMap<GroupLabel, Option<f64>> = BTreeMap::new();
    for (label, value) in labels.into_iter().zip(values) {
        if let Some(label) = label {
            groups.insert(label, value);
        }
    }

    let points = match group_key {
        GroupKey::Season => Season::ALL
            .into_iter()
            .map(|season| {
                let label = GroupLabel::Season(season);
                let value = match groups.get(&label) {
                    Some(value) => *value,
                    None => reducer.empty_value(),
                };
                SeriesPoint { label, value }
            })
            .collect(),
        _ => groups
            .into_iter()
            .map(|(label, value)| SeriesPoint { label, value })
            .collect(),
    };

    Ok(OrderedSeries {
        group_key,
        metric,
        reducer,
        points,
    })
}

fn group_labels(grouped: &DataFrame, group_key: GroupKey) -> PolarsResult<Vec<Option<GroupLabel>>> {
    let column = grouped.column(group_key.column_name())?;
    let labels = match group_key {
        GroupKey::Year | GroupKey::Month => column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|value| {
                value.and_then(|value| match group_key {
                    GroupKey::Year => i32::try_from(value).ok().map(GroupLabel::Year),
                    _ => u32::try_from(value).ok().map(GroupLabel::Month),
                })
            })
            .collect(),
        GroupKey::Season => column
            .str()?
            .into_iter()
            .map(|name| name.and_then(Season::from_name).map(GroupLabel::Season))
            .collect(),
        GroupKey::Station => column
            .str()?
            .into_iter()
            .map(|name| name.map(|name| GroupLabel::Station(name.to_string())))
            .collect(),
        GroupKey::WindDirection => column
            .str()?
            .into_iter()
            .map(|name| name.map(|name| GroupLabel::WindDirection(name.to_string())))
            .collect(),
    };
    Ok(labels)
}
