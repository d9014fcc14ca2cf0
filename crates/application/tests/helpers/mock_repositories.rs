#![allow(dead_code)]

use async_trait::async_trait;
use polydns_application::ports::{
    CacheStats, CertificateInfo, DnsCachePort, DomainRoutePort, ImportSummary, QueryLogPort,
    RecordStorePort, ServerAvailability, TransportDiagnosticsPort, UpstreamPort, UpstreamQuery,
};
use polydns_domain::config::QueryLogConfig;
use polydns_domain::{
    CacheOptions, CustomRecord, CustomRecordSpec, DnsRecord, DomainError, DomainRoute, LogEntry,
    LogFilter, LogSource, Protocol, QueryEvent, RecordType,
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;

/// Scripted transport: one canned outcome per protocol, every call recorded.
#[derive(Default)]
pub struct MockUpstream {
    responses: Mutex<HashMap<Protocol, Result<Vec<DnsRecord>, DomainError>>>,
    reverse_response: Mutex<Option<Result<Vec<DnsRecord>, DomainError>>>,
    calls: Mutex<Vec<(Protocol, UpstreamQuery)>>,
    reverse_calls: Mutex<Vec<IpAddr>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, protocol: Protocol, records: Vec<DnsRecord>) {
        self.responses
            .lock()
            .unwrap()
            .insert(protocol, Ok(records));
    }

    pub fn fail(&self, protocol: Protocol, error: DomainError) {
        self.responses
            .lock()
            .unwrap()
            .insert(protocol, Err(error));
    }

    pub fn respond_reverse(&self, result: Result<Vec<DnsRecord>, DomainError>) {
        *self.reverse_response.lock().unwrap() = Some(result);
    }

    pub fn calls(&self) -> Vec<(Protocol, UpstreamQuery)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn protocols_called(&self) -> Vec<Protocol> {
        self.calls.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }

    pub fn reverse_calls(&self) -> Vec<IpAddr> {
        self.reverse_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamPort for MockUpstream {
    async fn query(
        &self,
        protocol: Protocol,
        query: &UpstreamQuery,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        self.calls.lock().unwrap().push((protocol, query.clone()));
        self.responses
            .lock()
            .unwrap()
            .get(&protocol)
            .cloned()
            .unwrap_or_else(|| Err(DomainError::transport(protocol, "no response scripted")))
    }

    async fn reverse_system(
        &self,
        ip: IpAddr,
        _client_ip: IpAddr,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        self.reverse_calls.lock().unwrap().push(ip);
        self.reverse_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(DomainError::transport("system", "no response scripted")))
    }
}

#[derive(Default)]
pub struct MockCache {
    entries: Mutex<HashMap<(String, RecordType), Vec<DnsRecord>>>,
    disabled: Mutex<bool>,
    hits: Mutex<u64>,
    misses: Mutex<u64>,
    last_options: Mutex<Option<CacheOptions>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn contains(&self, domain: &str, record_type: RecordType) -> bool {
        self.entries
            .lock()
            .unwrap()
            .contains_key(&(domain.to_lowercase(), record_type))
    }

    pub fn last_options(&self) -> Option<CacheOptions> {
        *self.last_options.lock().unwrap()
    }
}

impl DnsCachePort for MockCache {
    fn get(&self, domain: &str, record_type: RecordType) -> Option<Vec<DnsRecord>> {
        if *self.disabled.lock().unwrap() {
            return None;
        }
        let found = self
            .entries
            .lock()
            .unwrap()
            .get(&(domain.to_lowercase(), record_type))
            .cloned();
        if found.is_some() {
            *self.hits.lock().unwrap() += 1;
        } else {
            *self.misses.lock().unwrap() += 1;
        }
        found
    }

    fn set(&self, domain: &str, record_type: RecordType, data: Vec<DnsRecord>, _ttl: Option<u32>) {
        if *self.disabled.lock().unwrap() {
            return;
        }
        self.entries
            .lock()
            .unwrap()
            .insert((domain.to_lowercase(), record_type), data);
    }

    fn remove(&self, domain: &str, record_type: Option<RecordType>) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(d, t), _| !(d == domain && record_type.map_or(true, |rt| rt == *t)));
        entries.len() != before
    }

    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn clear_expired(&self) -> usize {
        0
    }

    fn configure(&self, options: CacheOptions) {
        if let Some(enable) = options.enable {
            *self.disabled.lock().unwrap() = !enable;
        }
        *self.last_options.lock().unwrap() = Some(options);
    }

    fn is_enabled(&self) -> bool {
        !*self.disabled.lock().unwrap()
    }

    fn stats(&self) -> CacheStats {
        let hits = *self.hits.lock().unwrap();
        let misses = *self.misses.lock().unwrap();
        CacheStats {
            size: self.len(),
            max_size: 1000,
            enabled: self.is_enabled(),
            ttl: 300,
            hits,
            misses,
            hit_rate: 0.0,
        }
    }
}

#[derive(Default)]
pub struct MockRecordStore {
    records: Mutex<Vec<CustomRecord>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, domain: &str, record_type: RecordType, value: &str) -> Self {
        self.add_record(domain, record_type, value, None, None)
            .unwrap();
        self
    }
}

impl RecordStorePort for MockRecordStore {
    fn add_record(
        &self,
        domain: &str,
        record_type: RecordType,
        value: &str,
        ttl: Option<u32>,
        priority: Option<u16>,
    ) -> Result<CustomRecord, DomainError> {
        let record = CustomRecord::new(
            domain,
            record_type,
            value,
            ttl.unwrap_or(300),
            priority.unwrap_or(10),
        )?;
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    fn update_record(
        &self,
        _domain: &str,
        _record_type: RecordType,
        _old_value: &str,
        _new_value: &str,
        _ttl: Option<u32>,
        _priority: Option<u16>,
    ) -> Result<bool, DomainError> {
        Ok(false)
    }

    fn delete_record(
        &self,
        _domain: &str,
        _record_type: Option<RecordType>,
        _value: Option<&str>,
    ) -> usize {
        0
    }

    fn get_records(&self, domain: &str, record_type: Option<RecordType>) -> Vec<CustomRecord> {
        let domain = domain.to_lowercase();
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.domain == domain && record_type.map_or(true, |t| t == r.record_type))
            .cloned()
            .collect()
    }

    fn import_records(&self, _records: Vec<CustomRecordSpec>) -> ImportSummary {
        ImportSummary::default()
    }

    fn export_records(&self) -> Vec<CustomRecordSpec> {
        Vec::new()
    }
}

#[derive(Default)]
pub struct MockQueryLog {
    events: Mutex<Vec<QueryEvent>>,
    policy: Mutex<Option<QueryLogConfig>>,
}

impl MockQueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<QueryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sources(&self) -> Vec<LogSource> {
        self.events.lock().unwrap().iter().map(|e| e.source).collect()
    }

    pub fn policy(&self) -> Option<QueryLogConfig> {
        self.policy.lock().unwrap().clone()
    }
}

impl QueryLogPort for MockQueryLog {
    fn add_log(&self, event: QueryEvent) -> bool {
        self.events.lock().unwrap().push(event);
        true
    }

    fn get_logs(&self, limit: usize, skip: usize) -> Vec<LogEntry> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .skip(skip)
            .take(limit)
            .cloned()
            .map(LogEntry::new)
            .collect()
    }

    fn filter_logs(&self, filter: &LogFilter, limit: usize, skip: usize) -> Vec<LogEntry> {
        self.get_logs(usize::MAX, 0)
            .into_iter()
            .filter(|e| filter.matches(e))
            .skip(skip)
            .take(limit)
            .collect()
    }

    fn logs_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    fn clear_logs(&self) {
        self.events.lock().unwrap().clear();
    }

    fn set_policy(&self, policy: QueryLogConfig) {
        *self.policy.lock().unwrap() = Some(policy);
    }
}

/// Exact-pattern routes; wildcard matching belongs to the real router.
#[derive(Default)]
pub struct MockRoutes {
    routes: Mutex<Vec<DomainRoute>>,
}

impl MockRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(self, pattern: &str, protocol: Protocol, server: Option<&str>) -> Self {
        self.routes.lock().unwrap().push(DomainRoute {
            pattern: pattern.to_string(),
            server: server.map(str::to_string),
            protocol,
            label: None,
        });
        self
    }
}

impl DomainRoutePort for MockRoutes {
    fn find(&self, domain: &str) -> Option<DomainRoute> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.pattern.eq_ignore_ascii_case(domain))
            .cloned()
    }

    fn replace(&self, routes: Vec<DomainRoute>) {
        *self.routes.lock().unwrap() = routes;
    }

    fn routes(&self) -> Vec<DomainRoute> {
        self.routes.lock().unwrap().clone()
    }
}

pub struct MockDiagnostics {
    certificate: Option<CertificateInfo>,
}

impl MockDiagnostics {
    pub fn with_certificate(certificate: CertificateInfo) -> Self {
        Self {
            certificate: Some(certificate),
        }
    }

    pub fn unreachable() -> Self {
        Self { certificate: None }
    }
}

#[async_trait]
impl TransportDiagnosticsPort for MockDiagnostics {
    async fn server_fingerprint(
        &self,
        host: &str,
        port: u16,
    ) -> Result<CertificateInfo, DomainError> {
        self.certificate
            .clone()
            .ok_or_else(|| DomainError::transport(format!("{}:{}", host, port), "refused"))
    }

    async fn quic_availability(&self, host: &str, port: u16) -> ServerAvailability {
        ServerAvailability {
            host: host.to_string(),
            port,
            available: false,
            protocol: "QUIC".to_string(),
            message: "QUIC probing is not implemented".to_string(),
        }
    }
}
