//! This module provides the main entry point of the crate: loading air-quality
//! datasets from disk through a cache that never serves stale data.

use crate::dataset::data_loader::{DatasetLoader, LoaderConfig};
use crate::dataset::dataset_cache::DatasetCache;
use crate::dataset::frame::Dataset;
use crate::error::AirQualityError;
use crate::types::source::Source;
use bon::bon;

/// The main struct for loading air-quality datasets.
///
/// Every load goes through an in-memory cache keyed by [`Source`]. A cached
/// dataset is only returned while the files it was read from are unchanged
/// (same set of files, sizes and modification times); otherwise the source is
/// read again.
///
/// Create an instance with [`AirQuality::default()`] for the default parsing
/// settings, or with [`AirQuality::builder()`] to override them.
///
/// # Examples
///
/// ```no_run
/// use airquality::{AirQuality, AirQualityError, GroupKey, Metric, Reducer, Source};
///
/// # fn run() -> Result<(), AirQualityError> {
/// let client = AirQuality::default();
/// let dataset = client.load(&Source::station_directory("data/PRSA")).call()?;
///
/// let seasonal = dataset
///     .filter()
///     .station("Dongsi")
///     .call()?
///     .aggregate(GroupKey::Season, Metric::Pm25, Reducer::Mean)?;
/// # Ok(())
/// # }
/// ```
pub struct AirQuality {
    cache: DatasetCache,
}

#[bon]
impl AirQuality {
    /// Creates a client with custom parsing settings.
    ///
    /// This method uses a builder pattern; omitted settings keep the values of
    /// [`LoaderConfig::default()`].
    ///
    /// # Arguments
    ///
    /// * `.timestamp_column(&str)`: Name of the timestamp column in merged files.
    /// * `.null_values(Vec<String>)`: Cell values read as missing.
    /// * `.infer_schema_length(usize)`: Rows used to infer column types.
    ///
    /// # Examples
    ///
    /// ```
    /// use airquality::AirQuality;
    ///
    /// let client = AirQuality::builder()
    ///     .timestamp_column("time")
    ///     .null_values(vec!["NA".to_string(), "-".to_string()])
    ///     .build();
    /// assert_eq!(client.config().timestamp_column, "time");
    /// assert_eq!(client.config().infer_schema_length, Some(10_000));
    /// ```
    #[builder]
    pub fn new(
        timestamp_column: Option<&str>,
        null_values: Option<Vec<String>>,
        infer_schema_length: Option<usize>,
    ) -> Self {
        let mut config = LoaderConfig::default();
        if let Some(timestamp_column) = timestamp_column {
            config.timestamp_column = timestamp_column.to_string();
        }
        if let Some(null_values) = null_values {
            config.null_values = null_values;
        }
        if let Some(infer_schema_length) = infer_schema_length {
            config.infer_schema_length = Some(infer_schema_length);
        }
        Self::with_config(config)
    }

    /// Creates a client from a complete [`LoaderConfig`].
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            cache: DatasetCache::new(DatasetLoader::new(config)),
        }
    }

    /// Loads the dataset of a [`Source`], reusing the cached copy while the
    /// source files are unchanged.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `load(&Source)`: **Required.** The merged file or station directory.
    /// * `.refresh(bool)`: Reload even if a valid cached copy exists. Defaults to `false`.
    ///
    /// Finally, call `.call()` on the builder.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::Dataset`] when the source is missing, has the
    /// wrong kind, holds no CSV files, or lacks a required column.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use airquality::{AirQuality, AirQualityError, Source};
    /// # fn run() -> Result<(), AirQualityError> {
    /// let client = AirQuality::default();
    /// let source = Source::merged_file("data/all_stations.csv");
    ///
    /// let dataset = client.load(&source).call()?;
    /// println!("{} rows, {} dropped", dataset.len(), dataset.report().dropped_rows);
    ///
    /// let reloaded = client.load(&source).refresh(true).call()?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = load)]
    pub fn load_dataset(
        &self,
        #[builder(start_fn)] source: &Source,
        refresh: Option<bool>,
    ) -> Result<Dataset, AirQualityError> {
        let refresh = refresh.unwrap_or(false);
        self.cache
            .get_dataset(source, refresh)
            .map_err(AirQualityError::from)
    }
}

impl AirQuality {
    /// The parsing settings this client loads with.
    pub fn config(&self) -> &LoaderConfig {
        self.cache.loader().config()
    }

    /// Drops every cached dataset.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for AirQuality {
    fn default() -> Self {
        Self::with_config(LoaderConfig::default())
    }
}
