use super::certificate::fetch_certificate;
use super::{
    udp, AttemptReporter, DirectClient, DohClient, DoqStub, DotClient, SystemClient,
    TransportClient,
};
use async_trait::async_trait;
use polydns_application::ports::{
    CertificateInfo, QueryLogPort, ServerAvailability, TransportDiagnosticsPort, UpstreamPort,
    UpstreamQuery,
};
use polydns_application::services::SharedResolverState;
use polydns_domain::{DnsRecord, DomainError, Protocol, UpstreamEndpoint};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Protocol dispatch over the transport clients, plus the diagnostics they
/// can answer.
pub struct UpstreamRegistry {
    state: SharedResolverState,
    system: Arc<SystemClient>,
    standard: TransportClient,
    custom: TransportClient,
    dot: TransportClient,
    doh: TransportClient,
    doq: DoqStub,
}

impl UpstreamRegistry {
    pub fn new(state: SharedResolverState, query_log: Arc<dyn QueryLogPort>) -> Self {
        let reporter = AttemptReporter::new(query_log);
        let system = SystemClient::new(reporter.clone());
        Self::with_system_client(state, reporter, system)
    }

    /// Registry whose system resolver talks to a fixed nameserver.
    pub fn with_system_client(
        state: SharedResolverState,
        reporter: AttemptReporter,
        system: SystemClient,
    ) -> Self {
        let system = Arc::new(system);
        Self {
            standard: TransportClient::Standard(system.clone()),
            custom: TransportClient::Direct(DirectClient::new(reporter.clone())),
            dot: TransportClient::Dot(DotClient::new(reporter.clone())),
            doh: TransportClient::Doh(DohClient::new(reporter.clone())),
            doq: DoqStub::new(system.clone(), state.clone(), reporter),
            system,
            state,
        }
    }
}

#[async_trait]
impl UpstreamPort for UpstreamRegistry {
    async fn query(
        &self,
        protocol: Protocol,
        query: &UpstreamQuery,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let client = match protocol {
            Protocol::Standard => &self.standard,
            Protocol::Custom => &self.custom,
            Protocol::Dot => &self.dot,
            Protocol::Doh => &self.doh,
            Protocol::Doq => return self.doq.query(query).await,
        };
        debug!(
            protocol = %client.protocol(),
            transport = client.name(),
            domain = %query.domain,
            "Upstream query"
        );
        client.query(query).await
    }

    async fn reverse_system(
        &self,
        ip: IpAddr,
        client_ip: IpAddr,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        self.system.reverse(ip, client_ip).await
    }
}

#[async_trait]
impl TransportDiagnosticsPort for UpstreamRegistry {
    async fn server_fingerprint(
        &self,
        host: &str,
        port: u16,
    ) -> Result<CertificateInfo, DomainError> {
        let mut endpoint = UpstreamEndpoint::builtin(Protocol::Dot).with_server_override(host);
        endpoint.port = port;
        endpoint.timeout = self.state.load().config.protocols.dot.timeout();

        let addr = udp::resolve_endpoint(&endpoint).await?;
        fetch_certificate(addr, host, endpoint.timeout).await
    }

    async fn quic_availability(&self, host: &str, port: u16) -> ServerAvailability {
        self.doq.availability(host, port)
    }
}
