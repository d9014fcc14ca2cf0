use crate::dns_protocol::Protocol;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 5000;

/// Priority assumed for servers that do not declare one.
const DEFAULT_SERVER_PRIORITY: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// One configured upstream. Fields not meaningful for a protocol are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpstreamServer {
    pub host: String,

    #[serde(default)]
    pub priority: Option<u32>,

    #[serde(default)]
    pub port: Option<u16>,

    /// TLS server name (DoT).
    #[serde(default)]
    pub servername: Option<String>,

    /// DoH request path.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub method: Option<HttpMethod>,

    /// DoH URL scheme, `https` unless overridden.
    #[serde(default)]
    pub scheme: Option<String>,
}

impl UpstreamServer {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            priority: None,
            port: None,
            servername: None,
            path: None,
            method: None,
            scheme: None,
        }
    }

    pub fn effective_priority(&self) -> u32 {
        self.priority.unwrap_or(DEFAULT_SERVER_PRIORITY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtocolSettings {
    #[serde(default)]
    pub enable: bool,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub servers: Vec<UpstreamServer>,
}

impl ProtocolSettings {
    pub fn enabled() -> Self {
        Self {
            enable: true,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_MS))
    }

    /// Lowest priority value wins; ties keep configuration order.
    pub fn primary_server(&self) -> Option<&UpstreamServer> {
        self.servers.iter().min_by_key(|s| s.effective_priority())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DoqSettings {
    #[serde(flatten)]
    pub settings: ProtocolSettings,

    /// Capability switch for the simulated QUIC transport.
    #[serde(default = "default_true")]
    pub quic_supported: bool,
}

impl Default for DoqSettings {
    fn default() -> Self {
        Self {
            settings: ProtocolSettings::default(),
            quic_supported: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtocolsConfig {
    #[serde(default = "ProtocolSettings::enabled")]
    pub standard: ProtocolSettings,

    #[serde(default)]
    pub custom: ProtocolSettings,

    #[serde(default)]
    pub dot: ProtocolSettings,

    #[serde(default)]
    pub doh: ProtocolSettings,

    #[serde(default)]
    pub doq: DoqSettings,
}

impl Default for ProtocolsConfig {
    fn default() -> Self {
        Self {
            standard: ProtocolSettings::enabled(),
            custom: ProtocolSettings::default(),
            dot: ProtocolSettings::default(),
            doh: ProtocolSettings::default(),
            doq: DoqSettings::default(),
        }
    }
}

impl ProtocolsConfig {
    pub fn get(&self, protocol: Protocol) -> &ProtocolSettings {
        match protocol {
            Protocol::Standard => &self.standard,
            Protocol::Custom => &self.custom,
            Protocol::Dot => &self.dot,
            Protocol::Doh => &self.doh,
            Protocol::Doq => &self.doq.settings,
        }
    }

    pub fn get_mut(&mut self, protocol: Protocol) -> &mut ProtocolSettings {
        match protocol {
            Protocol::Standard => &mut self.standard,
            Protocol::Custom => &mut self.custom,
            Protocol::Dot => &mut self.dot,
            Protocol::Doh => &mut self.doh,
            Protocol::Doq => &mut self.doq.settings,
        }
    }

    /// Resolves the server a protocol client should contact: the configured
    /// primary server or the built-in default, plus the protocol timeout.
    pub fn endpoint(&self, protocol: Protocol) -> UpstreamEndpoint {
        let settings = self.get(protocol);
        let mut endpoint = UpstreamEndpoint::builtin(protocol);
        endpoint.timeout = settings.timeout();

        if let Some(server) = settings.primary_server() {
            endpoint.host = server.host.clone();
            if let Some(port) = server.port {
                endpoint.port = port;
            }
            endpoint.servername = server
                .servername
                .clone()
                .unwrap_or_else(|| server.host.clone());
            if let Some(path) = &server.path {
                endpoint.path = path.clone();
            }
            if let Some(method) = server.method {
                endpoint.method = method;
            }
            if let Some(scheme) = &server.scheme {
                endpoint.scheme = scheme.clone();
            }
        }

        endpoint
    }
}

/// Fully resolved connection parameters for one upstream attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEndpoint {
    pub host: String,
    pub port: u16,
    pub servername: String,
    pub path: String,
    pub method: HttpMethod,
    pub scheme: String,
    pub timeout: Duration,
}

impl UpstreamEndpoint {
    pub fn builtin(protocol: Protocol) -> Self {
        let (host, port, servername) = match protocol {
            Protocol::Dot => ("1.1.1.1", 853, "cloudflare-dns.com"),
            Protocol::Doq => ("1.1.1.1", 853, "1.1.1.1"),
            Protocol::Doh => ("dns.google", 443, "dns.google"),
            Protocol::Custom => ("8.8.8.8", 53, "8.8.8.8"),
            Protocol::Standard => ("127.0.0.1", 53, "localhost"),
        };
        Self {
            host: host.to_string(),
            port,
            servername: servername.to_string(),
            path: "/dns-query".to_string(),
            method: HttpMethod::Get,
            scheme: "https".to_string(),
            timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
        }
    }

    /// Replaces the host for a single query. Accepts `host`, `ip`, `ip:port`
    /// and `[v6]:port`. A hostname also becomes the TLS server name.
    pub fn with_server_override(mut self, server: &str) -> Self {
        let server = server.trim();
        if let Ok(addr) = server.parse::<SocketAddr>() {
            self.host = addr.ip().to_string();
            self.port = addr.port();
            return self;
        }
        if let Ok(ip) = server.parse::<IpAddr>() {
            self.host = ip.to_string();
            return self;
        }
        match server.rsplit_once(':') {
            Some((host, port)) if port.parse::<u16>().is_ok() => {
                self.host = host.to_string();
                self.port = port.parse().unwrap_or(self.port);
            }
            _ => self.host = server.to_string(),
        }
        self.servername = self.host.clone();
        self
    }

    /// `host:port` suitable for socket resolution; IPv6 literals are bracketed.
    pub fn authority(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{}]:{}", v6, self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    pub fn doh_url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        let default_port = match self.scheme.as_str() {
            "http" => 80,
            _ => 443,
        };
        let host = match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{}]", v6),
            _ => self.host.clone(),
        };
        if self.port == default_port {
            format!("{}://{}{}", self.scheme, host, path)
        } else {
            format!("{}://{}:{}{}", self.scheme, host, self.port, path)
        }
    }
}

fn default_true() -> bool {
    true
}
