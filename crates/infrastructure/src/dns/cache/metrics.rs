use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

// align(64) keeps the hot lookup counters on their own cache line.
#[derive(Default)]
#[repr(align(64))]
pub struct CacheMetrics {
    // Hot counters, updated on every lookup.
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    _hot_pad: [u64; 6],

    // Cold counters, updated on writes and maintenance.
    pub insertions: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
}

impl CacheMetrics {
    /// Percentage of lookups served from cache; 0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(AtomicOrdering::Relaxed) as f64;
        let total = hits + self.misses.load(AtomicOrdering::Relaxed) as f64;

        if total > 0.0 {
            (hits / total) * 100.0
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.insertions,
            &self.evictions,
            &self.expirations,
        ] {
            counter.store(0, AtomicOrdering::Relaxed);
        }
    }
}
