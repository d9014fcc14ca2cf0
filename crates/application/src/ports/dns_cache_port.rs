use polydns_domain::{CacheOptions, DnsRecord, RecordType};
use serde::Serialize;

/// Snapshot of cache occupancy and hit accounting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub enabled: bool,
    pub ttl: u32,
    pub hits: u64,
    pub misses: u64,
    /// Percentage in `0.0..=100.0`, zero before the first lookup.
    pub hit_rate: f64,
}

pub trait DnsCachePort: Send + Sync {
    /// `None` is a miss. A disabled cache always misses without counting.
    fn get(&self, domain: &str, record_type: RecordType) -> Option<Vec<DnsRecord>>;

    /// Without an explicit ttl the lowest positive record ttl is used, then the
    /// configured default.
    fn set(&self, domain: &str, record_type: RecordType, data: Vec<DnsRecord>, ttl: Option<u32>);

    /// With no type every cacheable type for the domain is dropped.
    fn remove(&self, domain: &str, record_type: Option<RecordType>) -> bool;

    fn clear(&self);

    /// Returns the number of entries swept.
    fn clear_expired(&self) -> usize;

    fn configure(&self, options: CacheOptions);

    fn is_enabled(&self) -> bool;

    fn stats(&self) -> CacheStats;
}
