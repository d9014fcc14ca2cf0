use crate::ports::{
    DnsCachePort, DomainRoutePort, QueryLogPort, RecordStorePort, UpstreamPort, UpstreamQuery,
};
use crate::services::{ResolverState, SharedResolverState};
use polydns_domain::{DnsRecord, DomainError, LogSource, Protocol, QueryEvent, RecordType};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Client address recorded when the caller does not supply one.
pub const DEFAULT_CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Block list, custom records, cache, protocol dispatch and fallback, in that
/// order. Transport clients log their own attempts; the engine logs the
/// short-circuit stages and whole-chain failures.
pub struct ResolutionEngine {
    pub(crate) state: SharedResolverState,
    pub(crate) upstream: Arc<dyn UpstreamPort>,
    pub(crate) cache: Arc<dyn DnsCachePort>,
    pub(crate) records: Arc<dyn RecordStorePort>,
    pub(crate) query_log: Arc<dyn QueryLogPort>,
    pub(crate) routes: Arc<dyn DomainRoutePort>,
}

impl ResolutionEngine {
    pub fn new(
        state: SharedResolverState,
        upstream: Arc<dyn UpstreamPort>,
        cache: Arc<dyn DnsCachePort>,
        records: Arc<dyn RecordStorePort>,
        query_log: Arc<dyn QueryLogPort>,
        routes: Arc<dyn DomainRoutePort>,
    ) -> Self {
        Self {
            state,
            upstream,
            cache,
            records,
            query_log,
            routes,
        }
    }

    pub fn state(&self) -> Arc<ResolverState> {
        self.state.load_full()
    }

    /// Resolves `(domain, record_type)`. Fails only when the first protocol
    /// attempt and every fallback fail; the first attempt's error is returned.
    pub async fn lookup(
        &self,
        domain: &str,
        record_type: RecordType,
        client_ip: IpAddr,
        protocol: Option<Protocol>,
        server: Option<&str>,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let start = Instant::now();
        let state = self.state.load_full();

        if state.blocked.is_blocked(domain) {
            debug!(domain = %domain, record_type = %record_type, "Domain blocked");
            self.log(
                QueryEvent::success(LogSource::Blocked, domain, record_type, client_ip, vec![])
                    .with_response_time(start.elapsed()),
            );
            return Ok(Vec::new());
        }

        let custom = self.records.get_records(domain, Some(record_type));
        if !custom.is_empty() {
            let records: Vec<DnsRecord> = custom
                .iter()
                .filter_map(|record| record.to_dns_record().ok())
                .collect();
            debug!(domain = %domain, count = records.len(), "Answered from custom records");
            self.log(
                QueryEvent::success(
                    LogSource::Custom,
                    domain,
                    record_type,
                    client_ip,
                    records.clone(),
                )
                .with_response_time(start.elapsed()),
            );
            return Ok(records);
        }

        if let Some(cached) = self.cache.get(domain, record_type) {
            debug!(domain = %domain, record_type = %record_type, "Cache hit");
            self.log(
                QueryEvent::success(
                    LogSource::Cache,
                    domain,
                    record_type,
                    client_ip,
                    cached.clone(),
                )
                .with_response_time(start.elapsed()),
            );
            return Ok(cached);
        }

        let use_protocol = protocol.unwrap_or(state.config.default_protocol);

        if !state.is_supported(use_protocol) {
            debug!(
                protocol = %use_protocol,
                domain = %domain,
                "Protocol not supported, using system resolver"
            );
            return match self
                .attempt(&state, Protocol::Standard, domain, record_type, client_ip, server)
                .await
            {
                Ok(records) => {
                    self.cache.set(domain, record_type, records.clone(), None);
                    Ok(records)
                }
                Err(e) => {
                    self.log_chain_failure(domain, record_type, client_ip, &e, start);
                    Err(e)
                }
            };
        }

        let original = match self
            .attempt(&state, use_protocol, domain, record_type, client_ip, server)
            .await
        {
            Ok(records) => {
                self.cache.set(domain, record_type, records.clone(), None);
                return Ok(records);
            }
            Err(e) => e,
        };

        warn!(
            protocol = %use_protocol,
            domain = %domain,
            error = %original,
            "Protocol attempt failed, walking fallback order"
        );

        let fallbacks = state
            .config
            .fallback_order
            .iter()
            .copied()
            .filter(|p| *p != use_protocol && state.is_supported(*p));

        for fallback in fallbacks {
            match self
                .attempt(&state, fallback, domain, record_type, client_ip, server)
                .await
            {
                Ok(records) => {
                    debug!(protocol = %fallback, domain = %domain, "Fallback succeeded");
                    self.cache.set(domain, record_type, records.clone(), None);
                    return Ok(records);
                }
                Err(e) => {
                    debug!(protocol = %fallback, domain = %domain, error = %e, "Fallback failed");
                }
            }
        }

        self.log_chain_failure(domain, record_type, client_ip, &original, start);
        Err(original)
    }

    /// PTR resolution for `ip`. The standard protocol, or any unsupported one,
    /// uses native reverse resolution; others query the `arpa` name.
    pub async fn reverse(
        &self,
        ip: IpAddr,
        client_ip: IpAddr,
        protocol: Option<Protocol>,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let state = self.state.load_full();
        let use_protocol = protocol.unwrap_or(state.config.default_protocol);

        let original = match self.reverse_with(&state, ip, client_ip, use_protocol).await {
            Ok(records) => return Ok(records),
            Err(e) => e,
        };

        let fallbacks = state
            .config
            .fallback_order
            .iter()
            .copied()
            .filter(|p| *p != use_protocol && state.is_supported(*p));

        for fallback in fallbacks {
            match self.reverse_with(&state, ip, client_ip, fallback).await {
                Ok(records) => return Ok(records),
                Err(e) => {
                    debug!(protocol = %fallback, ip = %ip, error = %e, "Reverse fallback failed");
                }
            }
        }

        Err(original)
    }

    async fn reverse_with(
        &self,
        state: &ResolverState,
        ip: IpAddr,
        client_ip: IpAddr,
        protocol: Protocol,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        if protocol == Protocol::Standard || !state.is_supported(protocol) {
            return self.upstream.reverse_system(ip, client_ip).await;
        }
        self.lookup(
            &reverse_lookup_name(ip),
            RecordType::PTR,
            client_ip,
            Some(protocol),
            None,
        )
        .await
    }

    /// One protocol attempt. An upstream "no such record" answer is a
    /// successful empty result and never triggers fallback.
    async fn attempt(
        &self,
        state: &ResolverState,
        protocol: Protocol,
        domain: &str,
        record_type: RecordType,
        client_ip: IpAddr,
        server: Option<&str>,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let mut endpoint = state.config.protocols.endpoint(protocol);
        if let Some(server) = server {
            endpoint = endpoint.with_server_override(server);
        }

        let query = UpstreamQuery {
            domain: domain.to_string(),
            record_type,
            client_ip,
            endpoint,
        };

        debug!(
            protocol = %protocol,
            domain = %domain,
            record_type = %record_type,
            server = %query.endpoint.authority(),
            "Dispatching query"
        );

        match self.upstream.query(protocol, &query).await {
            Err(e) if e.is_no_record() => Ok(Vec::new()),
            other => other,
        }
    }

    fn log_chain_failure(
        &self,
        domain: &str,
        record_type: RecordType,
        client_ip: IpAddr,
        error: &DomainError,
        start: Instant,
    ) {
        self.log(
            QueryEvent::failure(LogSource::Error, domain, record_type, client_ip, error)
                .with_response_time(start.elapsed()),
        );
    }

    fn log(&self, event: QueryEvent) {
        self.query_log.add_log(event);
    }
}

/// `in-addr.arpa` name for IPv4, nibble-reversed `ip6.arpa` name for IPv6.
pub fn reverse_lookup_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{}.{}.{}.{}.in-addr.arpa", d, c, b, a)
        }
        IpAddr::V6(v6) => {
            let mut labels: Vec<String> = Vec::with_capacity(33);
            for byte in v6.octets().iter().rev() {
                labels.push(format!("{:x}", byte & 0x0f));
                labels.push(format!("{:x}", byte >> 4));
            }
            labels.push("ip6.arpa".to_string());
            labels.join(".")
        }
    }
}
