pub mod data_loader;
pub mod dataset_cache;
pub mod error;
pub mod frame;
