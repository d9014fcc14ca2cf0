//! DNS-over-TLS client (RFC 7858).

use super::framing::{read_with_length_prefix, send_with_length_prefix};
use super::reporter::AttemptReporter;
use super::udp::resolve_endpoint;
use crate::dns::wire::{decode_answer, encode_query, message_id, Answer};
use polydns_application::ports::UpstreamQuery;
use polydns_domain::{DnsRecord, DomainError, LogSource, Protocol};
use rustls::pki_types::ServerName;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

/// Shared TLS config, built once and reused for every DoT query.
static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
});

pub struct DotClient {
    reporter: AttemptReporter,
    tls_config: Arc<rustls::ClientConfig>,
}

impl DotClient {
    pub fn new(reporter: AttemptReporter) -> Self {
        Self::with_tls_config(reporter, SHARED_TLS_CONFIG.clone())
    }

    pub fn with_tls_config(
        reporter: AttemptReporter,
        tls_config: Arc<rustls::ClientConfig>,
    ) -> Self {
        Self {
            reporter,
            tls_config,
        }
    }

    pub async fn query(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let started = Instant::now();
        let server = query.endpoint.authority();

        let (source, outcome) = match self.exchange(query).await {
            Ok(answer) if answer.manual => (LogSource::DotManual, Ok(answer.records)),
            Ok(answer) => (Protocol::Dot.log_source(), Ok(answer.records)),
            Err(e) => (Protocol::Dot.log_source(), Err(e)),
        };

        self.reporter
            .report(source, query, &server, started, &outcome);
        outcome
    }

    async fn exchange(&self, query: &UpstreamQuery) -> Result<Answer, DomainError> {
        let endpoint = &query.endpoint;
        let timeout = endpoint.timeout;
        let server_addr = resolve_endpoint(endpoint).await?;
        let message = encode_query(&query.domain, query.record_type)?;

        let mut stream = connect(
            self.tls_config.clone(),
            server_addr,
            &endpoint.servername,
            timeout,
        )
        .await?;

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, &message))
            .await
            .map_err(|_| DomainError::timeout(server_addr))??;

        let response = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| DomainError::timeout(server_addr))??;

        debug!(
            server = %server_addr,
            servername = %endpoint.servername,
            response_len = response.len(),
            "DoT response received"
        );

        decode_answer(message_id(&message), &response, &query.domain)
    }
}

/// TCP connect plus TLS handshake, each bounded by `timeout`.
pub(crate) async fn connect(
    tls_config: Arc<rustls::ClientConfig>,
    server_addr: SocketAddr,
    servername: &str,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>, DomainError> {
    let connector = tokio_rustls::TlsConnector::from(tls_config);

    let server_name = ServerName::try_from(servername.to_string()).map_err(|e| {
        DomainError::Validation(format!("Invalid TLS server name '{}': {}", servername, e))
    })?;

    let tcp_stream = tokio::time::timeout(timeout, TcpStream::connect(server_addr))
        .await
        .map_err(|_| DomainError::timeout(server_addr))?
        .map_err(|e| DomainError::transport(server_addr, format!("connect failed: {}", e)))?;

    let tls_stream = tokio::time::timeout(timeout, connector.connect(server_name, tcp_stream))
        .await
        .map_err(|_| DomainError::timeout(server_addr))?
        .map_err(|e| DomainError::transport(server_addr, format!("TLS handshake failed: {}", e)))?;

    debug!(server = %server_addr, servername = %servername, "TLS connection established");
    Ok(tls_stream)
}
