use super::metrics::CacheMetrics;
use compact_str::{format_compact, CompactString};
use polydns_application::ports::{CacheStats, DnsCachePort};
use polydns_domain::config::CacheConfig;
use polydns_domain::{CacheOptions, DnsRecord, RecordType};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<DnsRecord>,
    created_at: Instant,
    /// Insertion sequence, breaks ties between equal `created_at` values.
    seq: u64,
    expires_at: Instant,
    ttl: u32,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Resolved-answer cache keyed by `domain:TYPE`. Full caches evict the entry
/// created first, regardless of how recently it was read.
pub struct CacheStore {
    entries: RwLock<FxHashMap<CompactString, CacheEntry>>,
    enabled: AtomicBool,
    default_ttl: AtomicU32,
    max_size: AtomicUsize,
    next_seq: AtomicU64,
    metrics: CacheMetrics,
}

impl CacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            enabled: AtomicBool::new(config.enable),
            default_ttl: AtomicU32::new(config.ttl),
            max_size: AtomicUsize::new(config.max_size.max(1)),
            next_seq: AtomicU64::new(0),
            metrics: CacheMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// TTL the entry was stored with, `None` when absent.
    pub fn entry_ttl(&self, domain: &str, record_type: RecordType) -> Option<u32> {
        self.read_entries()
            .get(&cache_key(domain, record_type))
            .map(|entry| entry.ttl)
    }

    fn read_entries(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, FxHashMap<CompactString, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, FxHashMap<CompactString, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Explicit ttl, else the smallest positive record ttl, else the default.
    fn effective_ttl(&self, data: &[DnsRecord], ttl: Option<u32>) -> u32 {
        ttl.filter(|t| *t > 0)
            .or_else(|| data.iter().map(|r| r.ttl).filter(|t| *t > 0).min())
            .unwrap_or_else(|| self.default_ttl.load(Ordering::Relaxed))
    }

    fn evict_oldest(&self, entries: &mut FxHashMap<CompactString, CacheEntry>) -> bool {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| (entry.created_at, entry.seq))
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                entries.remove(&key);
                self.metrics.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Evicted oldest cache entry");
                true
            }
            None => false,
        }
    }
}

impl DnsCachePort for CacheStore {
    fn get(&self, domain: &str, record_type: RecordType) -> Option<Vec<DnsRecord>> {
        if !self.is_enabled() {
            return None;
        }

        let key = cache_key(domain, record_type);
        let now = Instant::now();

        let expired = match self.read_entries().get(&key) {
            None => false,
            Some(entry) if entry.is_expired(now) => true,
            Some(entry) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.data.clone());
            }
        };

        if expired {
            let mut entries = self.write_entries();
            if entries.get(&key).is_some_and(|e| e.is_expired(now)) {
                entries.remove(&key);
                self.metrics.expirations.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn set(&self, domain: &str, record_type: RecordType, data: Vec<DnsRecord>, ttl: Option<u32>) {
        if !self.is_enabled() {
            return;
        }

        let key = cache_key(domain, record_type);
        let ttl = self.effective_ttl(&data, ttl);
        let now = Instant::now();
        let entry = CacheEntry {
            data,
            created_at: now,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            expires_at: now + Duration::from_secs(u64::from(ttl)),
            ttl,
        };

        let mut entries = self.write_entries();
        if !entries.contains_key(&key) && entries.len() >= self.max_size.load(Ordering::Relaxed) {
            self.evict_oldest(&mut entries);
        }
        entries.insert(key, entry);
        self.metrics.insertions.fetch_add(1, Ordering::Relaxed);
    }

    fn remove(&self, domain: &str, record_type: Option<RecordType>) -> bool {
        let mut entries = self.write_entries();
        match record_type {
            Some(record_type) => entries.remove(&cache_key(domain, record_type)).is_some(),
            None => RecordType::CACHEABLE
                .iter()
                .map(|t| entries.remove(&cache_key(domain, *t)).is_some())
                .fold(false, |any, removed| any || removed),
        }
    }

    fn clear(&self) {
        let mut entries = self.write_entries();
        let count = entries.len();
        entries.clear();
        self.metrics.reset();
        debug!(count, "Cache cleared");
    }

    fn clear_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write_entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        self.metrics
            .expirations
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    fn configure(&self, options: CacheOptions) {
        if let Some(enable) = options.enable {
            self.enabled.store(enable, Ordering::Relaxed);
        }
        if let Some(ttl) = options.ttl.filter(|t| *t > 0) {
            self.default_ttl.store(ttl, Ordering::Relaxed);
        }
        if let Some(max_size) = options.max_size.filter(|m| *m > 0) {
            self.max_size.store(max_size, Ordering::Relaxed);
            let mut entries = self.write_entries();
            while entries.len() > max_size {
                if !self.evict_oldest(&mut entries) {
                    break;
                }
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            max_size: self.max_size.load(Ordering::Relaxed),
            enabled: self.is_enabled(),
            ttl: self.default_ttl.load(Ordering::Relaxed),
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            hit_rate: self.metrics.hit_rate(),
        }
    }
}

fn cache_key(domain: &str, record_type: RecordType) -> CompactString {
    format_compact!("{}:{}", domain.to_lowercase(), record_type.as_str())
}
