use super::reporter::AttemptReporter;
use super::udp;
use crate::dns::wire::{decode_answer, encode_query, message_id};
use crate::system::system_nameserver;
use polydns_application::ports::UpstreamQuery;
use polydns_application::use_cases::dns::reverse_lookup_name;
use polydns_domain::{DnsRecord, DomainError, Protocol, RecordType, UpstreamEndpoint, DEFAULT_TTL};
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::debug;

/// Operating-system resolution: addresses through the host resolver, mail,
/// text and nameserver records through the configured system nameserver.
pub struct SystemClient {
    reporter: AttemptReporter,
    nameserver: SocketAddr,
}

impl SystemClient {
    pub fn new(reporter: AttemptReporter) -> Self {
        Self::with_nameserver(reporter, system_nameserver())
    }

    pub fn with_nameserver(reporter: AttemptReporter, nameserver: SocketAddr) -> Self {
        Self {
            reporter,
            nameserver,
        }
    }

    pub fn nameserver(&self) -> SocketAddr {
        self.nameserver
    }

    pub async fn query(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let started = Instant::now();
        let server = self.server_label(query.record_type);

        let outcome = self.resolve(query).await;

        self.reporter
            .report(Protocol::Standard.log_source(), query, &server, started, &outcome);
        outcome
    }

    /// Resolution without an attempt log entry, for transports that borrow
    /// the system resolver and log under their own source.
    pub async fn resolve(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        match query.record_type {
            RecordType::A | RecordType::AAAA => {
                self.lookup_addresses(&query.domain, query.record_type, query.endpoint.timeout)
                    .await
            }
            RecordType::MX | RecordType::TXT | RecordType::NS => {
                self.query_nameserver(&query.domain, query.record_type, query.endpoint.timeout)
                    .await
            }
            other => Err(DomainError::UnsupportedRecordType(format!(
                "{} is not resolvable through the system resolver",
                other
            ))),
        }
    }

    /// PTR records for `ip` from the system nameserver.
    pub async fn reverse(
        &self,
        ip: IpAddr,
        client_ip: IpAddr,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let started = Instant::now();
        let name = reverse_lookup_name(ip);
        let query = UpstreamQuery {
            domain: name.clone(),
            record_type: RecordType::PTR,
            client_ip,
            endpoint: UpstreamEndpoint::builtin(Protocol::Standard),
        };

        let outcome = self
            .query_nameserver(&name, RecordType::PTR, query.endpoint.timeout)
            .await
            .map(|records| {
                records
                    .into_iter()
                    .filter(|r| r.record_type == RecordType::PTR)
                    .map(|r| DnsRecord::target(&name, RecordType::PTR, r.value(), DEFAULT_TTL))
                    .collect::<Vec<_>>()
            });

        self.reporter.report(
            Protocol::Standard.log_source(),
            &query,
            &self.nameserver.to_string(),
            started,
            &outcome,
        );
        outcome
    }

    async fn lookup_addresses(
        &self,
        domain: &str,
        record_type: RecordType,
        timeout: Duration,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let addrs = tokio::time::timeout(timeout, tokio::net::lookup_host((domain, 0)))
            .await
            .map_err(|_| DomainError::timeout("system resolver"))?
            .map_err(|e| {
                debug!(domain = %domain, error = %e, "System resolver lookup failed");
                DomainError::transport("system resolver", e)
            })?;

        let want_v4 = record_type == RecordType::A;
        let mut records: Vec<DnsRecord> = Vec::new();
        for addr in addrs {
            let ip = addr.ip();
            if ip.is_ipv4() == want_v4 && !records.iter().any(|r| r.ip() == Some(ip)) {
                records.push(DnsRecord::address(domain, ip, DEFAULT_TTL));
            }
        }

        if records.is_empty() {
            return Err(DomainError::no_record(domain, record_type));
        }
        Ok(records)
    }

    async fn query_nameserver(
        &self,
        domain: &str,
        record_type: RecordType,
        timeout: Duration,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let message = encode_query(domain, record_type)?;
        let response = udp::exchange(self.nameserver, &message, timeout).await?;
        let records = decode_answer(message_id(&message), &response, domain)?.records;

        Ok(records
            .into_iter()
            .map(|mut record| {
                record.ttl = DEFAULT_TTL;
                record
            })
            .collect())
    }

    fn server_label(&self, record_type: RecordType) -> String {
        if record_type.is_address() {
            "system resolver".to_string()
        } else {
            self.nameserver.to_string()
        }
    }
}
