use crate::config::ConfigError;
use crate::dns_protocol::Protocol;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-domain override of server and protocol, consumed read-only by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRoute {
    /// Exact domain or single-label wildcard pattern (`*.example.com`).
    pub pattern: String,
    pub server: Option<String>,
    pub protocol: Protocol,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteEntry {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub dns: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// On-disk route file: two labelled groups, domestic first.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteFile {
    #[serde(default)]
    pub domestic: Vec<RouteEntry>,
    #[serde(default)]
    pub foreign: Vec<RouteEntry>,
}

impl RouteFile {
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.display().to_string(), e.to_string()))?;
        Self::parse(&contents)
    }

    /// Flattens both groups into match order. A pattern listed twice keeps its
    /// first position and takes the later entry's target.
    pub fn into_routes(self) -> Vec<DomainRoute> {
        let mut routes: Vec<DomainRoute> = Vec::new();

        for entry in self.domestic.into_iter().chain(self.foreign) {
            let Some(pattern) = entry.domain.filter(|d| !d.trim().is_empty()) else {
                continue;
            };
            let protocol = entry
                .protocol
                .as_deref()
                .and_then(|p| p.parse().ok())
                .unwrap_or(Protocol::Standard);
            let route = DomainRoute {
                pattern,
                server: entry.dns.filter(|s| !s.trim().is_empty()),
                protocol,
                label: entry.name,
            };

            match routes.iter_mut().find(|r| r.pattern == route.pattern) {
                Some(existing) => *existing = route,
                None => routes.push(route),
            }
        }

        routes
    }
}
