pub mod metrics;
pub mod store;

pub use metrics::CacheMetrics;
pub use store::CacheStore;
