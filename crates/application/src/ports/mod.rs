mod diagnostics;
mod dns_cache_port;
mod domain_route_port;
mod query_log_port;
mod record_store_port;
mod upstream;

pub use diagnostics::{CertificateInfo, ServerAvailability, TransportDiagnosticsPort};
pub use dns_cache_port::{CacheStats, DnsCachePort};
pub use domain_route_port::DomainRoutePort;
pub use query_log_port::QueryLogPort;
pub use record_store_port::{ImportSummary, RecordStorePort};
pub use upstream::{UpstreamPort, UpstreamQuery};
