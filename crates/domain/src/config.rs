mod cache;
mod dns;
mod errors;
mod logging;
mod protocols;
mod query_log;
mod root;
mod security;
mod server;

pub use cache::{CacheConfig, CacheOptions};
pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use protocols::{
    DoqSettings, HttpMethod, ProtocolSettings, ProtocolsConfig, UpstreamEndpoint, UpstreamServer,
    DEFAULT_UPSTREAM_TIMEOUT_MS,
};
pub use query_log::QueryLogConfig;
pub use root::{validate_allowed_ips, CliOverrides, Config, GeneralConfig};
pub use security::{DnssecConfig, RateLimitConfig, SecurityConfig};
pub use server::ServerConfig;
