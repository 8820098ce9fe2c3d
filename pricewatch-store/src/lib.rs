pub mod app_config;
pub mod ingest;
pub mod snapshot;

pub use snapshot::PriceSnapshot;
