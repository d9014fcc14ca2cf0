//! Peer certificate inspection for DoT diagnostics. The handshake accepts any
//! certificate; chain validity is checked separately and reported.

use super::tls::connect;
use polydns_application::ports::CertificateInfo;
use polydns_domain::DomainError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme};
use sha2::{Digest, Sha256};
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;

static INSPECTION_TLS_CONFIG: LazyLock<Arc<ClientConfig>> = LazyLock::new(|| {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    let config = ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
        .with_no_client_auth();
    Arc::new(config)
});

/// Handshakes with `addr` and describes the certificate it presents.
pub async fn fetch_certificate(
    addr: SocketAddr,
    host: &str,
    timeout: Duration,
) -> Result<CertificateInfo, DomainError> {
    let stream = connect(INSPECTION_TLS_CONFIG.clone(), addr, host, timeout).await?;
    let (_, connection) = stream.get_ref();

    let chain = connection
        .peer_certificates()
        .filter(|certs| !certs.is_empty())
        .ok_or_else(|| DomainError::transport(addr, "server presented no certificate"))?;

    let info = describe_chain(chain, host)?;
    debug!(
        server = %addr,
        fingerprint = %info.fingerprint,
        valid = info.valid,
        "Peer certificate inspected"
    );
    Ok(info)
}

/// Fingerprint and names of the leaf; `valid` reflects a web PKI chain check
/// for `host`.
pub fn describe_chain(
    chain: &[CertificateDer<'_>],
    host: &str,
) -> Result<CertificateInfo, DomainError> {
    let leaf = chain
        .first()
        .ok_or_else(|| DomainError::UpstreamProtocol("empty certificate chain".into()))?;

    let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref()).map_err(|e| {
        DomainError::UpstreamProtocol(format!("unparseable peer certificate: {}", e))
    })?;

    let validity = cert.validity();
    Ok(CertificateInfo {
        fingerprint: fingerprint(leaf.as_ref()),
        valid: verify_chain(chain, host),
        issuer: cert.issuer().to_string(),
        subject: cert.subject().to_string(),
        valid_from: validity.not_before.to_string(),
        valid_to: validity.not_after.to_string(),
    })
}

/// SHA-256 digest as colon separated upper-case hex pairs.
pub fn fingerprint(der: &[u8]) -> String {
    Sha256::digest(der)
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(":")
}

fn verify_chain(chain: &[CertificateDer<'_>], host: &str) -> bool {
    let Some((leaf, intermediates)) = chain.split_first() else {
        return false;
    };
    let Ok(server_name) = ServerName::try_from(host.to_string()) else {
        return false;
    };

    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());

    match WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider).build() {
        Ok(verifier) => verifier
            .verify_server_cert(leaf, intermediates, &server_name, &[], UnixTime::now())
            .map_err(|e| debug!(host = %host, error = %e, "Certificate chain rejected"))
            .is_ok(),
        Err(e) => {
            debug!(error = %e, "Certificate verifier unavailable");
            false
        }
    }
}

#[derive(Debug)]
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
