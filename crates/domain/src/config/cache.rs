use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enable: bool,

    /// Fallback TTL in seconds when no record carries a positive one.
    #[serde(default = "default_cache_ttl")]
    pub ttl: u32,

    #[serde(default = "default_max_size")]
    pub max_size: usize,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable: true,
            ttl: default_cache_ttl(),
            max_size: default_max_size(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Partial update applied by `configure`; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheOptions {
    pub enable: Option<bool>,
    pub ttl: Option<u32>,
    pub max_size: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u32 {
    300
}

fn default_max_size() -> usize {
    1000
}

fn default_cleanup_interval() -> u64 {
    600
}
