use polydns_domain::Config;
use polydns_infrastructure::repositories::{
    DomainRouteRepository, InMemoryQueryLog, InMemoryRecordRepository,
};
use std::sync::Arc;

/// In-memory stores, built once per process and shared by handle.
pub struct Repositories {
    pub query_log: Arc<InMemoryQueryLog>,
    pub records: Arc<InMemoryRecordRepository>,
    pub routes: Arc<DomainRouteRepository>,
}

impl Repositories {
    pub fn new(config: &Config) -> Self {
        Self {
            query_log: Arc::new(InMemoryQueryLog::new(config.dns.query_log.clone())),
            records: Arc::new(InMemoryRecordRepository::new()),
            routes: Arc::new(DomainRouteRepository::empty()),
        }
    }
}
