#![allow(dead_code)]

mod dns_server_mock;
mod http_mock;
mod tls_mock;

pub use dns_server_mock::{build_response, MockAnswer, MockDnsServer};
pub use http_mock::{MockHttpReply, MockHttpServer, RecordedRequest};
pub use tls_mock::{MockTlsServer, TLS_SERVERNAME};

use polydns_application::ports::UpstreamQuery;
use polydns_domain::config::{HttpMethod, QueryLogConfig};
use polydns_domain::{Protocol, RecordType, UpstreamEndpoint};
use polydns_infrastructure::repositories::InMemoryQueryLog;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub fn query_log() -> Arc<InMemoryQueryLog> {
    Arc::new(InMemoryQueryLog::new(QueryLogConfig::default()))
}

/// Endpoint pointing at a local mock server with a short timeout.
pub fn local_endpoint(protocol: Protocol, addr: SocketAddr) -> UpstreamEndpoint {
    let mut endpoint = UpstreamEndpoint::builtin(protocol);
    endpoint.host = addr.ip().to_string();
    endpoint.port = addr.port();
    endpoint.timeout = Duration::from_millis(500);
    endpoint
}

/// DoT endpoint for the mock TLS server, verified against its leaf name.
pub fn dot_endpoint(addr: SocketAddr) -> UpstreamEndpoint {
    let mut endpoint = local_endpoint(Protocol::Dot, addr);
    endpoint.servername = TLS_SERVERNAME.to_string();
    endpoint
}

/// Plain-HTTP DoH endpoint for the mock HTTP server.
pub fn doh_endpoint(addr: SocketAddr, path: &str, method: HttpMethod) -> UpstreamEndpoint {
    let mut endpoint = local_endpoint(Protocol::Doh, addr);
    endpoint.scheme = "http".to_string();
    endpoint.path = path.to_string();
    endpoint.method = method;
    endpoint.timeout = Duration::from_secs(2);
    endpoint
}

pub fn upstream_query(
    domain: &str,
    record_type: RecordType,
    endpoint: UpstreamEndpoint,
) -> UpstreamQuery {
    UpstreamQuery {
        domain: domain.to_string(),
        record_type,
        client_ip: "192.0.2.50".parse().unwrap(),
        endpoint,
    }
}
