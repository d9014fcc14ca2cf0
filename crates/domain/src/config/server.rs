use serde::{Deserialize, Serialize};

/// Listener settings. Consumed by the hosting listener; the resolver only keeps
/// the latest snapshot so it can be reloaded and reported.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    #[serde(default = "default_true")]
    pub udp: bool,

    #[serde(default = "default_true")]
    pub tcp: bool,

    #[serde(default = "default_true")]
    pub recursion: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            udp: true,
            tcp: true,
            recursion: true,
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_dns_port() -> u16 {
    53
}

fn default_true() -> bool {
    true
}
