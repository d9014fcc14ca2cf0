use crate::dns::wire::{encode_format_error, encode_response, parse_query};
use polydns_application::use_cases::{QueryRequest, ResolutionEngine};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Largest inbound query accepted; longer datagrams are truncated by the socket.
const MAX_QUERY_SIZE: usize = 4096;

/// Turns raw query datagrams into raw responses through the resolution engine.
#[derive(Clone)]
pub struct DnsServerHandler {
    engine: Arc<ResolutionEngine>,
}

impl DnsServerHandler {
    pub fn new(engine: Arc<ResolutionEngine>) -> Self {
        Self { engine }
    }

    /// `None` when the datagram is too short to carry an id to answer.
    pub async fn handle_raw_udp(&self, query_buf: &[u8], client_ip: IpAddr) -> Option<Vec<u8>> {
        let query = match parse_query(query_buf) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %client_ip, error = %e, "Rejecting malformed query");
                return encode_format_error(query_buf);
            }
        };

        debug!(
            domain = %query.name,
            qtype = query.qtype,
            client = %client_ip,
            "DNS query received"
        );

        let request = QueryRequest {
            name: query.name.clone(),
            qtype: query.qtype,
            client_ip: Some(client_ip),
        };
        let response = self.engine.handle_query(&request).await;

        debug!(
            domain = %query.name,
            rcode = ?response.rcode,
            answers = response.answers.len(),
            "Sending response"
        );

        Some(encode_response(
            &query,
            query_buf,
            response.rcode.to_u8(),
            &response.answers,
        ))
    }
}

/// UDP front end: one task per datagram, shared socket for replies.
pub struct UdpListener {
    socket: Arc<UdpSocket>,
    handler: DnsServerHandler,
}

impl UdpListener {
    pub async fn bind(addr: SocketAddr, handler: DnsServerHandler) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::from_socket(socket, handler))
    }

    pub fn from_socket(socket: UdpSocket, handler: DnsServerHandler) -> Self {
        Self {
            socket: Arc::new(socket),
            handler,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serves until `shutdown` is cancelled. In-flight queries finish on
    /// their own tasks.
    pub async fn run(self, shutdown: CancellationToken) {
        let local = self
            .socket
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default();
        info!(bind_address = %local, "DNS server listening on UDP");

        let mut recv_buf = [0u8; MAX_QUERY_SIZE];
        loop {
            let (len, from) = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(bind_address = %local, "DNS server stopping");
                    break;
                }
                received = self.socket.recv_from(&mut recv_buf) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        // ICMP port unreachable surfaces here on some platforms.
                        warn!(error = %e, "UDP recv error");
                        continue;
                    }
                },
            };

            let owned_buf: Arc<[u8]> = Arc::from(&recv_buf[..len]);
            let handler = self.handler.clone();
            let socket = self.socket.clone();
            tokio::spawn(async move {
                if let Some(response) = handler.handle_raw_udp(&owned_buf, from.ip()).await {
                    if let Err(e) = socket.send_to(&response, from).await {
                        error!(client = %from, error = %e, "Failed to send response");
                    }
                }
            });
        }
    }
}
