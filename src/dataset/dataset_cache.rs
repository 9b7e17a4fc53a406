use crate::dataset::data_loader::DatasetLoader;
use crate::dataset::error::DatasetError;
use crate::dataset::frame::Dataset;
use crate::types::source::Source;
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Identity of one file on disk at the moment it was inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

/// Identity of every file a source load reads. Two equal fingerprints mean the
/// same files with the same sizes and modification times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceFingerprint(Vec<FileStamp>);

impl SourceFingerprint {
    pub(crate) fn of(source: &Source) -> Result<Self, DatasetError> {
        DatasetLoader::source_files(source)?
            .into_iter()
            .map(|path| {
                let metadata = fs::metadata(&path).map_err(|e| DatasetError::Io(path.clone(), e))?;
                Ok(FileStamp {
                    len: metadata.len(),
                    modified: metadata.modified().ok(),
                    path,
                })
            })
            .collect::<Result<Vec<_>, DatasetError>>()
            .map(SourceFingerprint)
    }
}

struct CachedDataset {
    fingerprint: SourceFingerprint,
    dataset: Dataset,
}

/// Read-through cache in front of [`DatasetLoader::load`].
///
/// Entries are keyed by [`Source`] and validated against a fingerprint of the
/// source files (path, size, modification time) on every lookup, so a dataset
/// is reloaded as soon as a file is added, removed or rewritten.
pub struct DatasetCache {
    loader: DatasetLoader,
    datasets: Mutex<HashMap<Source, CachedDataset>>,
}

impl DatasetCache {
    pub fn new(loader: DatasetLoader) -> Self {
        Self {
            loader,
            datasets: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &DatasetLoader {
        &self.loader
    }

    /// Returns the dataset for `source`, loading it if it is not cached or if
    /// the files changed since it was cached. `refresh` forces a reload.
    pub fn get_dataset(&self, source: &Source, refresh: bool) -> Result<Dataset, DatasetError> {
        // Taken before loading: a change made during the load invalidates the entry
        let fingerprint = SourceFingerprint::of(source)?;

        if !refresh {
            let cache = self.lock();
            match cache.get(source) {
                Some(cached) if cached.fingerprint == fingerprint => {
                    debug!("Cache hit for {}", source);
                    return Ok(cached.dataset.clone());
                }
                Some(_) => debug!("Cached dataset for {} is stale, reloading", source),
                None => debug!("Cache miss for {}", source),
            }
        }

        // Loading happens without holding the lock
        let dataset = self.loader.load(source)?;
        Ok(self.store(source, fingerprint, dataset, refresh))
    }

    /// Inserts a freshly loaded dataset. If an entry with the same fingerprint
    /// was inserted while this one was loading, that entry is kept and returned
    /// unless `refresh` was requested.
    fn store(
        &self,
        source: &Source,
        fingerprint: SourceFingerprint,
        dataset: Dataset,
        refresh: bool,
    ) -> Dataset {
        let mut cache = self.lock();
        match cache.entry(source.clone()) {
            Entry::Occupied(entry) if !refresh && entry.get().fingerprint == fingerprint => {
                entry.get().dataset.clone()
            }
            Entry::Occupied(mut entry) => {
                entry.insert(CachedDataset {
                    fingerprint,
                    dataset: dataset.clone(),
                });
                dataset
            }
            Entry::Vacant(entry) => {
                entry.insert(CachedDataset {
                    fingerprint,
                    dataset: dataset.clone(),
                });
                dataset
            }
        }
    }

    /// Drops the cached dataset for `source`, if any.
    pub fn evict(&self, source: &Source) -> bool {
        self.lock().remove(source).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Source, CachedDataset>> {
        // Entries are replaced whole, so a poisoned map is still consistent
        self.datasets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
