use crate::ports::{
    CertificateInfo, ServerAvailability, TransportDiagnosticsPort, UpstreamPort, UpstreamQuery,
};
use crate::services::{SharedResolverState, SupportedProtocols};
use crate::use_cases::dns::DEFAULT_CLIENT_IP;
use polydns_domain::{ErrorReport, Protocol, RecordType, UpstreamEndpoint};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const CHECK_DOMAIN: &str = "example.com";

#[derive(Debug, Clone, Serialize)]
pub struct DotConnectionReport {
    pub host: String,
    pub port: u16,
    pub servername: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DohConnectionReport {
    pub host: String,
    pub path: String,
    pub success: bool,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

/// Operator-facing checks of encrypted upstreams.
pub struct ConnectionDiagnosticsUseCase {
    state: SharedResolverState,
    upstream: Arc<dyn UpstreamPort>,
    diagnostics: Arc<dyn TransportDiagnosticsPort>,
}

impl ConnectionDiagnosticsUseCase {
    pub fn new(
        state: SharedResolverState,
        upstream: Arc<dyn UpstreamPort>,
        diagnostics: Arc<dyn TransportDiagnosticsPort>,
    ) -> Self {
        Self {
            state,
            upstream,
            diagnostics,
        }
    }

    pub fn supported_protocols(&self) -> SupportedProtocols {
        self.state.load().supported
    }

    /// Fetches the peer certificate; a TLS or socket failure is reported, not raised.
    pub async fn test_dot_connection(
        &self,
        host: &str,
        port: u16,
        servername: Option<&str>,
    ) -> DotConnectionReport {
        let servername = servername.unwrap_or(host).to_string();
        debug!(host = %host, port, servername = %servername, "Testing DoT connection");

        match self.diagnostics.server_fingerprint(host, port).await {
            Ok(certificate) => DotConnectionReport {
                host: host.to_string(),
                port,
                servername,
                success: true,
                certificate: Some(certificate),
                error: None,
            },
            Err(e) => DotConnectionReport {
                host: host.to_string(),
                port,
                servername,
                success: false,
                certificate: None,
                error: Some(ErrorReport::from(&e)),
            },
        }
    }

    /// Resolves `example.com` A through the given DoH server.
    pub async fn test_doh_connection(&self, host: &str, path: &str) -> DohConnectionReport {
        let mut endpoint = UpstreamEndpoint::builtin(Protocol::Doh);
        endpoint.host = host.to_string();
        endpoint.servername = host.to_string();
        endpoint.path = path.to_string();
        endpoint.timeout = self.state.load().config.protocols.doh.timeout();

        let query = UpstreamQuery {
            domain: CHECK_DOMAIN.to_string(),
            record_type: RecordType::A,
            client_ip: DEFAULT_CLIENT_IP,
            endpoint,
        };

        let start = Instant::now();
        let result = self.upstream.query(Protocol::Doh, &query).await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        DohConnectionReport {
            host: host.to_string(),
            path: path.to_string(),
            success: result.is_ok(),
            response_time_ms,
            error: result.err().map(|e| ErrorReport::from(&e)),
        }
    }

    pub async fn test_doq_connection(&self, host: &str, port: u16) -> ServerAvailability {
        self.diagnostics.quic_availability(host, port).await
    }
}
