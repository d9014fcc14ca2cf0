use serde::{Deserialize, Serialize};

/// Security settings. Only `blocked_domains` is enforced by the resolver; the
/// remaining fields are stored and reloadable configuration state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub blocked_domains: Vec<String>,

    /// CIDR notation.
    #[serde(default = "default_allowed_ips")]
    pub allowed_ips: Vec<String>,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub dnssec: DnssecConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            blocked_domains: Vec::new(),
            allowed_ips: default_allowed_ips(),
            rate_limit: RateLimitConfig::default(),
            dnssec: DnssecConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enable: bool,

    /// Queries per client per minute.
    #[serde(default = "default_threshold")]
    pub threshold: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enable: false,
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DnssecConfig {
    #[serde(default)]
    pub enable: bool,
}

fn default_allowed_ips() -> Vec<String> {
    vec!["0.0.0.0/0".to_string()]
}

fn default_threshold() -> u32 {
    1000
}
