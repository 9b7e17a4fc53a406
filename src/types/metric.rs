//! Defines the pollutant and meteorological variables carried by every dataset,
//! together with the column names they are stored under.

use crate::analysis::error::QueryError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub(crate) const COL_DATETIME: &str = "datetime";
pub(crate) const COL_STATION: &str = "station";
pub(crate) const COL_WIND_DIRECTION: &str = "wd";

// Per-station source files
pub(crate) const COL_YEAR: &str = "year";
pub(crate) const COL_MONTH: &str = "month";
pub(crate) const COL_DAY: &str = "day";
pub(crate) const COL_HOUR: &str = "hour";

// Derived calendar features
pub(crate) const COL_SEASON: &str = "season";

/// A numeric variable measured at a station.
///
/// Each variant maps to one Float64 column of a [`crate::Dataset`]. Wind direction
/// is a categorical code and is kept separately in the `wd` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Metric {
    /// Fine particulate matter, `PM2.5` (µg/m³).
    Pm25,
    /// Coarse particulate matter, `PM10` (µg/m³).
    Pm10,
    /// Sulphur dioxide, `SO2` (µg/m³).
    So2,
    /// Nitrogen dioxide, `NO2` (µg/m³).
    No2,
    /// Carbon monoxide, `CO` (µg/m³).
    Co,
    /// Ozone, `O3` (µg/m³).
    O3,
    /// Air temperature, `TEMP` (°C).
    Temperature,
    /// Wind speed, `WSPM` (m/s).
    WindSpeed,
}

impl Metric {
    /// Every metric, in the column order used by loaded datasets.
    pub const ALL: [Metric; 8] = [
        Metric::Pm25,
        Metric::Pm10,
        Metric::So2,
        Metric::No2,
        Metric::Co,
        Metric::O3,
        Metric::Temperature,
        Metric::WindSpeed,
    ];

    /// The column name this metric is read from and stored under.
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Pm25 => "PM2.5",
            Metric::Pm10 => "PM10",
            Metric::So2 => "SO2",
            Metric::No2 => "NO2",
            Metric::Co => "CO",
            Metric::O3 => "O3",
            Metric::Temperature => "TEMP",
            Metric::WindSpeed => "WSPM",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// Parses a metric from its column name (`"PM2.5"`, `"TEMP"`, ...).
///
/// # Examples
///
/// ```
/// use airquality::Metric;
///
/// assert_eq!("PM2.5".parse::<Metric>().unwrap(), Metric::Pm25);
/// assert!("PM1".parse::<Metric>().is_err());
/// ```
impl FromStr for Metric {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.column_name() == s)
            .ok_or_else(|| QueryError::InvalidArgument(format!("unknown metric '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_round_trip() -> Result<(), QueryError> {
        for metric in Metric::ALL {
            assert_eq!(metric.column_name().parse::<Metric>()?, metric);
        }
        Ok(())
    }

    #[test]
    fn test_unknown_metric_is_invalid_argument() {
        let err = "pm25".parse::<Metric>().unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
    }
}
