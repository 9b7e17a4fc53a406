//! Defines where a dataset is loaded from.

use std::fmt;
use std::path::{Path, PathBuf};

/// The input a [`crate::Dataset`] is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// One pre-merged CSV file with a timestamp column plus pollutant columns.
    MergedFile(PathBuf),
    /// A directory of per-station CSV files, each with `year`, `month`, `day`
    /// (and optionally `hour`) columns. The file stem is the station identifier.
    StationDirectory(PathBuf),
}

impl Source {
    pub fn merged_file(path: impl AsRef<Path>) -> Self {
        Source::MergedFile(path.as_ref().to_path_buf())
    }

    pub fn station_directory(path: impl AsRef<Path>) -> Self {
        Source::StationDirectory(path.as_ref().to_path_buf())
    }

    /// The file or directory path of this source.
    pub fn path(&self) -> &Path {
        match self {
            Source::MergedFile(path) | Source::StationDirectory(path) => path,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::MergedFile(path) => write!(f, "merged file '{}'", path.display()),
            Source::StationDirectory(path) => write!(f, "station directory '{}'", path.display()),
        }
    }
}
