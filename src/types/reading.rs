use crate::types::metric::Metric;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// One timestamped measurement row for a station.
///
/// Metrics that were not measured at that station and time are simply absent
/// from `values`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub station: String,
    pub values: BTreeMap<Metric, f64>,
    pub wind_direction: Option<String>, // wd (compass code, e.g. "NNE")
}

impl Reading {
    /// Creates a reading without any measured values.
    pub fn new(timestamp: NaiveDateTime, station: &str) -> Self {
        Self {
            timestamp,
            station: station.to_string(),
            values: BTreeMap::new(),
            wind_direction: None,
        }
    }

    /// Sets the value of a metric, returning the updated reading.
    pub fn with_value(mut self, metric: Metric, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }

    /// Sets the wind direction code, returning the updated reading.
    pub fn with_wind_direction(mut self, wind_direction: &str) -> Self {
        self.wind_direction = Some(wind_direction.to_string());
        self
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }
}
