//! Datagram exchange for plain DNS (RFC 1035 §4.2.1).

use polydns_domain::{DomainError, UpstreamEndpoint};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Sends one query and waits for the first datagram from the server.
/// Datagrams from other sources are ignored.
pub async fn exchange(
    server_addr: SocketAddr,
    message_bytes: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, DomainError> {
    let bind_addr: SocketAddr = if server_addr.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|e| DomainError::transport(server_addr, format!("bind failed: {}", e)))?;

    tokio::time::timeout(timeout, socket.send_to(message_bytes, server_addr))
        .await
        .map_err(|_| DomainError::timeout(server_addr))?
        .map_err(|e| DomainError::transport(server_addr, format!("send failed: {}", e)))?;

    debug!(server = %server_addr, bytes_sent = message_bytes.len(), "UDP query sent");

    let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
    let received = tokio::time::timeout(timeout, async {
        loop {
            let (len, from) = socket.recv_from(&mut recv_buf).await?;
            if from == server_addr {
                return Ok::<usize, std::io::Error>(len);
            }
            warn!(
                expected = %server_addr,
                received_from = %from,
                "UDP response from unexpected source"
            );
        }
    })
    .await
    .map_err(|_| DomainError::timeout(server_addr))?
    .map_err(|e| DomainError::transport(server_addr, format!("receive failed: {}", e)))?;

    recv_buf.truncate(received);
    debug!(server = %server_addr, bytes_received = received, "UDP response received");
    Ok(recv_buf)
}

/// Resolves an endpoint's `host:port` to the first socket address.
pub async fn resolve_endpoint(endpoint: &UpstreamEndpoint) -> Result<SocketAddr, DomainError> {
    let authority = endpoint.authority();
    if let Ok(addr) = authority.parse::<SocketAddr>() {
        return Ok(addr);
    }

    let lookup = tokio::net::lookup_host(authority.as_str());
    let mut addrs = tokio::time::timeout(endpoint.timeout, lookup)
        .await
        .map_err(|_| DomainError::timeout(&authority))?
        .map_err(|e| DomainError::transport(&authority, format!("cannot resolve server: {}", e)))?;
    let first = addrs.next();
    first.ok_or_else(|| DomainError::transport(&authority, "server name has no addresses"))
}
