use polydns_domain::config::ServerConfig;
use polydns_infrastructure::dns::{DnsServerHandler, UdpListener};
use std::net::{IpAddr, SocketAddr};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Binds the UDP listener and serves until `shutdown` is cancelled.
pub async fn start_dns_server(
    server: &ServerConfig,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    if !server.udp {
        warn!("UDP listener disabled in [server]; nothing to serve");
        shutdown.cancelled().await;
        return Ok(());
    }
    if server.tcp {
        info!("TCP transport is not served; answering over UDP only");
    }

    let socket_addr = bind_address(server)?;
    let listener = UdpListener::bind(socket_addr, handler).await?;

    info!(bind_address = %listener.local_addr()?, "DNS server ready");
    listener.run(shutdown).await;
    info!("DNS server stopped");
    Ok(())
}

fn bind_address(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    let ip: IpAddr = server
        .bind_address
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address '{}': {}", server.bind_address, e))?;
    Ok(SocketAddr::new(ip, server.dns_port))
}
