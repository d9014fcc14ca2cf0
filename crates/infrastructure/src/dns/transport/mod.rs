//! Upstream transports, one client per protocol. Every client logs its own
//! attempts through an [`AttemptReporter`].

pub mod certificate;
pub mod direct;
pub mod doq;
pub mod framing;
pub mod https;
pub mod registry;
pub mod reporter;
pub mod system;
pub mod tls;
pub mod udp;

use polydns_application::ports::UpstreamQuery;
use polydns_domain::{DnsRecord, DomainError, Protocol};
use std::sync::Arc;

pub use direct::DirectClient;
pub use doq::DoqStub;
pub use https::{DohClient, DNS_MESSAGE_CONTENT_TYPE};
pub use registry::UpstreamRegistry;
pub use reporter::AttemptReporter;
pub use system::SystemClient;
pub use tls::DotClient;

pub enum TransportClient {
    Standard(Arc<SystemClient>),
    Direct(DirectClient),
    Dot(DotClient),
    Doh(DohClient),
    Doq(DoqStub),
}

impl TransportClient {
    pub async fn query(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        match self {
            Self::Standard(c) => c.query(query).await,
            Self::Direct(c) => c.query(query).await,
            Self::Dot(c) => c.query(query).await,
            Self::Doh(c) => c.query(query).await,
            Self::Doq(c) => c.query(query).await,
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Standard(_) => Protocol::Standard,
            Self::Direct(_) => Protocol::Custom,
            Self::Dot(_) => Protocol::Dot,
            Self::Doh(_) => Protocol::Doh,
            Self::Doq(_) => Protocol::Doq,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard(_) => "system",
            Self::Direct(_) => "UDP",
            Self::Dot(_) => "TLS",
            Self::Doh(_) => "HTTPS",
            Self::Doq(_) => "QUIC (simulated)",
        }
    }
}
