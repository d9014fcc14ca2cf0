use async_trait::async_trait;
use polydns_domain::{DnsRecord, DomainError, Protocol, RecordType, UpstreamEndpoint};
use std::net::IpAddr;

/// One protocol attempt as handed to a transport client.
#[derive(Debug, Clone)]
pub struct UpstreamQuery {
    pub domain: String,
    pub record_type: RecordType,
    pub client_ip: IpAddr,
    pub endpoint: UpstreamEndpoint,
}

/// Protocol dispatch over the transport clients. Implementations log every
/// attempt to the query log themselves.
#[async_trait]
pub trait UpstreamPort: Send + Sync {
    async fn query(
        &self,
        protocol: Protocol,
        query: &UpstreamQuery,
    ) -> Result<Vec<DnsRecord>, DomainError>;

    /// Native reverse resolution through the operating system's resolver.
    async fn reverse_system(
        &self,
        ip: IpAddr,
        client_ip: IpAddr,
    ) -> Result<Vec<DnsRecord>, DomainError>;
}
