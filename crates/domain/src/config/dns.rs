use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::protocols::ProtocolsConfig;
use super::query_log::QueryLogConfig;
use super::security::SecurityConfig;
use crate::dns_protocol::Protocol;

/// Everything the resolution engine reads at query time. Held as an atomically
/// swapped snapshot so reloads never block in-flight queries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_protocol")]
    pub default_protocol: Protocol,

    #[serde(default = "default_fallback_order")]
    pub fallback_order: Vec<Protocol>,

    #[serde(default)]
    pub debug: bool,

    /// JSON route file with `domestic`/`foreign` groups.
    #[serde(default)]
    pub custom_domains_file: Option<String>,

    #[serde(default)]
    pub protocols: ProtocolsConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub query_log: QueryLogConfig,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            default_protocol: default_protocol(),
            fallback_order: default_fallback_order(),
            debug: false,
            custom_domains_file: None,
            protocols: ProtocolsConfig::default(),
            cache: CacheConfig::default(),
            security: SecurityConfig::default(),
            query_log: QueryLogConfig::default(),
        }
    }
}

fn default_protocol() -> Protocol {
    Protocol::Standard
}

fn default_fallback_order() -> Vec<Protocol> {
    vec![Protocol::Standard]
}
