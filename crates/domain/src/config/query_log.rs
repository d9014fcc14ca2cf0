use crate::dns_protocol::LogSource;
use serde::{Deserialize, Serialize};

/// Policy for the in-memory query log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueryLogConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_true")]
    pub log_queries: bool,

    #[serde(default = "default_true")]
    pub log_responses: bool,

    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Days
    #[serde(default = "default_retention")]
    pub retention: u32,
}

impl QueryLogConfig {
    /// Response entries follow `log_responses`, everything else follows `log_queries`.
    pub fn allows(&self, source: LogSource) -> bool {
        match source {
            LogSource::Response => self.log_responses,
            _ => self.log_queries,
        }
    }
}

impl Default for QueryLogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            log_queries: true,
            log_responses: true,
            rotation: default_rotation(),
            retention: default_retention(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_retention() -> u32 {
    30
}
