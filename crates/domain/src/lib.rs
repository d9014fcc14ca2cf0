//! polydns domain layer
pub mod blocklist;
pub mod config;
pub mod dns_protocol;
pub mod dns_record;
pub mod domain_route;
pub mod errors;
pub mod query_log;

pub use blocklist::BlockedDomains;
pub use config::{CacheOptions, Config, ConfigError, DnsConfig, UpstreamEndpoint};
pub use dns_protocol::{LogSource, Protocol};
pub use dns_record::{
    CustomRecord, CustomRecordSpec, DnsRecord, RecordData, RecordType, CLASS_IN, DEFAULT_TTL,
};
pub use domain_route::{DomainRoute, RouteEntry, RouteFile};
pub use errors::{DomainError, ErrorReport};
pub use query_log::{LogEntry, LogFilter, QueryEvent};
