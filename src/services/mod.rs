//! Services for data loading and aggregation

pub mod aggregator;
pub mod config;
pub mod data_loader;
pub mod data_provider;

pub use aggregator::Aggregator;
pub use config::{Config, ThemePreference};
pub use data_loader::DataLoaderService;
pub use data_provider::{DataProvider, MockDataProvider, SnapshotFileProvider};
