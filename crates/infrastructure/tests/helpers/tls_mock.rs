use super::dns_server_mock::{build_response, MockAnswer};
use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

/// Name the responder's leaf certificate is issued for.
pub const TLS_SERVERNAME: &str = "localhost";

/// Length-prefixed DNS over TLS on 127.0.0.1, signed by a throwaway CA.
pub struct MockTlsServer {
    addr: SocketAddr,
    client_config: Arc<rustls::ClientConfig>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTlsServer {
    pub async fn start(answer: MockAnswer) -> Result<Self, Box<dyn std::error::Error>> {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut ca_params = CertificateParams::new(Vec::<String>::new())?;
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let ca_key = KeyPair::generate()?;
        let ca_cert = ca_params.self_signed(&ca_key)?;

        let leaf_key = KeyPair::generate()?;
        let leaf_cert = CertificateParams::new(vec![TLS_SERVERNAME.to_string()])?
            .signed_by(&leaf_key, &ca_cert, &ca_key)?;

        let server_config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(
                vec![leaf_cert.der().clone()],
                PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(leaf_key.serialize_der())),
            )?;

        let mut roots = rustls::RootCertStore::empty();
        roots.add(ca_cert.der().clone())?;
        let client_config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let acceptor = TlsAcceptor::from(Arc::new(server_config));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        if let Ok((tcp, _)) = accepted {
                            let acceptor = acceptor.clone();
                            let answer = answer.clone();
                            tokio::spawn(async move {
                                if let Ok(tls) = acceptor.accept(tcp).await {
                                    serve_connection(tls, answer).await;
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            client_config: Arc::new(client_config),
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Client config trusting only the responder's CA.
    pub fn client_config(&self) -> Arc<rustls::ClientConfig> {
        self.client_config.clone()
    }
}

impl Drop for MockTlsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_connection<S>(mut stream: S, answer: MockAnswer)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let mut len_buf = [0u8; 2];
    if stream.read_exact(&mut len_buf).await.is_err() {
        return;
    }
    let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    if stream.read_exact(&mut query).await.is_err() {
        return;
    }

    match build_response(&query, &answer) {
        Some(response) => {
            let _ = stream.write_all(&(response.len() as u16).to_be_bytes()).await;
            let _ = stream.write_all(&response).await;
            let _ = stream.flush().await;
        }
        // Keep the session open so the client has to give up on its own.
        None => tokio::time::sleep(Duration::from_secs(30)).await,
    }
}
