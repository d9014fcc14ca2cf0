use polydns_domain::config::QueryLogConfig;
use polydns_domain::{LogEntry, LogFilter, QueryEvent};

/// Bounded, newest-first record of resolution attempts.
pub trait QueryLogPort: Send + Sync {
    /// Returns false when the current policy dropped the event.
    fn add_log(&self, event: QueryEvent) -> bool;

    fn get_logs(&self, limit: usize, skip: usize) -> Vec<LogEntry>;

    fn filter_logs(&self, filter: &LogFilter, limit: usize, skip: usize) -> Vec<LogEntry>;

    fn logs_count(&self) -> usize;

    fn clear_logs(&self);

    fn set_policy(&self, policy: QueryLogConfig);
}
