use arc_swap::ArcSwap;
use polydns_application::ports::QueryLogPort;
use polydns_domain::config::QueryLogConfig;
use polydns_domain::{LogEntry, LogFilter, QueryEvent};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::trace;

pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Bounded newest-first query log held in memory. The policy decides which
/// sources are recorded; dropped entries are not an error.
pub struct InMemoryQueryLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    policy: ArcSwap<QueryLogConfig>,
}

impl InMemoryQueryLog {
    pub fn new(policy: QueryLogConfig) -> Self {
        Self::with_capacity(policy, DEFAULT_LOG_CAPACITY)
    }

    pub fn with_capacity(policy: QueryLogConfig, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            policy: ArcSwap::from_pointee(policy),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl QueryLogPort for InMemoryQueryLog {
    fn add_log(&self, event: QueryEvent) -> bool {
        if !self.policy.load().allows(event.source) {
            trace!(
                source = %event.source,
                domain = %event.domain,
                "Query log entry dropped by policy"
            );
            return false;
        }

        let entry = LogEntry::new(event);
        let mut entries = self.lock();
        entries.push_front(entry);
        while entries.len() > self.capacity {
            entries.pop_back();
        }
        true
    }

    fn get_logs(&self, limit: usize, skip: usize) -> Vec<LogEntry> {
        self.lock().iter().skip(skip).take(limit).cloned().collect()
    }

    fn filter_logs(&self, filter: &LogFilter, limit: usize, skip: usize) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|entry| filter.matches(entry))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    fn logs_count(&self) -> usize {
        self.lock().len()
    }

    fn clear_logs(&self) {
        self.lock().clear();
    }

    fn set_policy(&self, policy: QueryLogConfig) {
        self.policy.store(std::sync::Arc::new(policy));
    }
}
