use polydns_application::ports::DnsCachePort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;

/// Periodically drops expired cache entries so unread keys do not linger
/// until eviction.
pub struct CacheSweepJob {
    cache: Arc<dyn DnsCachePort>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl CacheSweepJob {
    pub fn new(cache: Arc<dyn DnsCachePort>) -> Self {
        Self {
            cache,
            interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, secs: u64) -> Self {
        self.interval_secs = secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// One sweep; returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        if !self.cache.is_enabled() {
            debug!("Cache disabled, sweep skipped");
            return 0;
        }
        let removed = self.cache.clear_expired();
        if removed > 0 {
            info!(
                removed,
                cache_size = self.cache.stats().size,
                "Expired cache entries swept"
            );
        }
        removed
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting cache sweep job");

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // the first tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("CacheSweepJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.sweep();
                }
            }
        }
    }
}
