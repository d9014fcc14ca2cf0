#![allow(dead_code)]

use polydns_application::ports::{CacheStats, DnsCachePort};
use polydns_domain::{CacheOptions, DnsRecord, RecordType};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Cache double that reports a fixed number of expired entries per sweep.
pub struct MockSweepCache {
    enabled: AtomicBool,
    expired_per_sweep: usize,
    sweeps: AtomicUsize,
}

impl MockSweepCache {
    pub fn new(expired_per_sweep: usize) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            expired_per_sweep,
            sweeps: AtomicUsize::new(0),
        }
    }

    pub fn disabled() -> Self {
        let cache = Self::new(3);
        cache.enabled.store(false, Ordering::SeqCst);
        cache
    }

    pub fn sweep_count(&self) -> usize {
        self.sweeps.load(Ordering::SeqCst)
    }
}

impl DnsCachePort for MockSweepCache {
    fn get(&self, _domain: &str, _record_type: RecordType) -> Option<Vec<DnsRecord>> {
        None
    }

    fn set(
        &self,
        _domain: &str,
        _record_type: RecordType,
        _data: Vec<DnsRecord>,
        _ttl: Option<u32>,
    ) {
    }

    fn remove(&self, _domain: &str, _record_type: Option<RecordType>) -> bool {
        false
    }

    fn clear(&self) {}

    fn clear_expired(&self) -> usize {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
        self.expired_per_sweep
    }

    fn configure(&self, options: CacheOptions) {
        if let Some(enable) = options.enable {
            self.enabled.store(enable, Ordering::SeqCst);
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            size: 0,
            max_size: 1000,
            enabled: self.is_enabled(),
            ttl: 300,
            hits: 0,
            misses: 0,
            hit_rate: 0.0,
        }
    }
}
