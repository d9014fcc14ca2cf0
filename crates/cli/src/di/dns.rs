use super::Repositories;
use polydns_application::services::{ResolverState, SharedResolverState};
use polydns_application::use_cases::ResolutionEngine;
use polydns_domain::Config;
use polydns_infrastructure::dns::{CacheStore, DnsServerHandler, UpstreamRegistry};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub state: SharedResolverState,
    pub cache: Arc<CacheStore>,
    pub upstream: Arc<UpstreamRegistry>,
    pub engine: Arc<ResolutionEngine>,
}

impl DnsServices {
    pub fn new(config: &Config, repos: &Repositories) -> Self {
        let state = ResolverState::shared(config.dns.clone());
        let supported = state.load().supported;
        info!(
            default_protocol = %config.dns.default_protocol,
            supported = ?supported,
            "Initializing resolution engine"
        );

        let cache = Arc::new(CacheStore::new(&config.dns.cache));
        let upstream = Arc::new(UpstreamRegistry::new(
            state.clone(),
            repos.query_log.clone(),
        ));

        let engine = Arc::new(ResolutionEngine::new(
            state.clone(),
            upstream.clone(),
            cache.clone(),
            repos.records.clone(),
            repos.query_log.clone(),
            repos.routes.clone(),
        ));

        Self {
            state,
            cache,
            upstream,
            engine,
        }
    }

    pub fn handler(&self) -> DnsServerHandler {
        DnsServerHandler::new(self.engine.clone())
    }
}
