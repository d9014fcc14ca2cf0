use async_trait::async_trait;
use polydns_domain::DomainError;
use serde::Serialize;

/// Peer certificate details collected without enforcing validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateInfo {
    /// SHA-256 of the DER certificate, colon separated upper-case hex.
    pub fingerprint: String,
    /// Whether the chain verifies against the bundled web PKI roots.
    pub valid: bool,
    pub issuer: String,
    pub subject: String,
    pub valid_from: String,
    pub valid_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerAvailability {
    pub host: String,
    pub port: u16,
    pub available: bool,
    pub protocol: String,
    pub message: String,
}

#[async_trait]
pub trait TransportDiagnosticsPort: Send + Sync {
    async fn server_fingerprint(
        &self,
        host: &str,
        port: u16,
    ) -> Result<CertificateInfo, DomainError>;

    async fn quic_availability(&self, host: &str, port: u16) -> ServerAvailability;
}
