use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing::debug;

pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

const DNS_PORT: u16 = 53;
const FALLBACK_NAMESERVER: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DNS_PORT);

/// First `nameserver` entry of the system resolver configuration, or
/// 127.0.0.1:53 when the file is missing or lists none.
pub fn system_nameserver() -> SocketAddr {
    nameserver_from_file(Path::new(RESOLV_CONF_PATH)).unwrap_or(FALLBACK_NAMESERVER)
}

pub fn nameserver_from_file(path: &Path) -> Option<SocketAddr> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| debug!(path = %path.display(), error = %e, "resolv.conf unreadable"))
        .ok()?;
    parse_nameserver(&contents)
}

pub fn parse_nameserver(contents: &str) -> Option<SocketAddr> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| line.strip_prefix("nameserver"))
        .filter_map(|rest| {
            // IPv6 entries may carry a zone id (fe80::1%eth0)
            let address = rest.split_whitespace().next()?.split('%').next()?;
            address.parse::<IpAddr>().ok()
        })
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .next()
}
