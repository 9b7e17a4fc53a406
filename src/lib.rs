mod air_quality;
mod analysis;
mod calendar;
mod dataset;
mod error;
mod filtering;
mod types;

pub use air_quality::AirQuality;
pub use error::AirQualityError;

pub use dataset::data_loader::{DatasetLoader, LoaderConfig};
pub use dataset::dataset_cache::DatasetCache;
pub use dataset::error::DatasetError;
pub use dataset::frame::{Dataset, LoadReport};

pub use calendar::derive_calendar_features;
pub use filtering::FilteredView;

pub use analysis::aggregate::{aggregate, GroupKey, GroupLabel, OrderedSeries, Reducer, SeriesPoint};
pub use analysis::correlation::{correlation_matrix, CorrelationMatrix};
pub use analysis::error::QueryError;

pub use types::metric::Metric;
pub use types::reading::Reading;
pub use types::season::{season_bucket, Season};
pub use types::source::Source;
