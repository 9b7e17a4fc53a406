use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Source '{0}' does not exist")]
    SourceNotFound(PathBuf),

    #[error("Source '{path}' is not a {expected}")]
    UnexpectedSourceKind {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("Station directory '{0}' contains no CSV files")]
    EmptySource(PathBuf),

    #[error("Required column '{column}' not found in '{source_path}'")]
    Schema { source_path: PathBuf, column: String },

    #[error("I/O error reading '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    // Errors raised by the CSV reader itself
    #[error("Parsing error reading CSV file '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
