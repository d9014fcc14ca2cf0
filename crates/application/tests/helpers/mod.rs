#![allow(dead_code)]

pub mod mock_repositories;

pub use mock_repositories::*;

use polydns_application::services::{ResolverState, SharedResolverState};
use polydns_application::use_cases::ResolutionEngine;
use polydns_domain::{DnsConfig, DnsRecord, Protocol};
use std::sync::Arc;

pub struct EngineFixture {
    pub engine: ResolutionEngine,
    pub state: SharedResolverState,
    pub upstream: Arc<MockUpstream>,
    pub cache: Arc<MockCache>,
    pub records: Arc<MockRecordStore>,
    pub log: Arc<MockQueryLog>,
    pub routes: Arc<MockRoutes>,
}

/// Standard and custom enabled, fallback `[standard, custom]`.
pub fn dns_config() -> DnsConfig {
    let mut config = DnsConfig::default();
    config.protocols.custom.enable = true;
    config.fallback_order = vec![Protocol::Standard, Protocol::Custom];
    config
}

pub fn engine_with(config: DnsConfig) -> EngineFixture {
    engine_with_parts(config, MockRecordStore::new(), MockRoutes::new())
}

pub fn engine_with_parts(
    config: DnsConfig,
    records: MockRecordStore,
    routes: MockRoutes,
) -> EngineFixture {
    let state = ResolverState::shared(config);
    let upstream = Arc::new(MockUpstream::new());
    let cache = Arc::new(MockCache::new());
    let records = Arc::new(records);
    let log = Arc::new(MockQueryLog::new());
    let routes = Arc::new(routes);

    let engine = ResolutionEngine::new(
        state.clone(),
        upstream.clone(),
        cache.clone(),
        records.clone(),
        log.clone(),
        routes.clone(),
    );

    EngineFixture {
        engine,
        state,
        upstream,
        cache,
        records,
        log,
        routes,
    }
}

pub fn a_record(name: &str, ip: &str) -> DnsRecord {
    DnsRecord::address(name, ip.parse().unwrap(), 300)
}
