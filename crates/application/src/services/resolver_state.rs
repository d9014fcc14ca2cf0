use arc_swap::ArcSwap;
use polydns_domain::{BlockedDomains, DnsConfig, Protocol};
use serde::Serialize;
use std::sync::Arc;

/// Live resolver snapshot shared by the engine, reload use case and transports.
pub type SharedResolverState = Arc<ArcSwap<ResolverState>>;

/// Per-protocol availability: enabled in configuration and, for DoQ, backed
/// by a transport that reports QUIC support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupportedProtocols {
    pub standard: bool,
    pub custom: bool,
    pub dot: bool,
    pub doh: bool,
    pub doq: bool,
}

impl SupportedProtocols {
    pub fn from_config(config: &DnsConfig) -> Self {
        let protocols = &config.protocols;
        Self {
            standard: protocols.standard.enable,
            custom: protocols.custom.enable,
            dot: protocols.dot.enable,
            doh: protocols.doh.enable,
            doq: protocols.doq.settings.enable && protocols.doq.quic_supported,
        }
    }

    pub fn get(&self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::Standard => self.standard,
            Protocol::Custom => self.custom,
            Protocol::Dot => self.dot,
            Protocol::Doh => self.doh,
            Protocol::Doq => self.doq,
        }
    }
}

/// Immutable configuration snapshot plus the values derived from it.
/// Reloads build a new snapshot with a bumped version and swap it in whole.
#[derive(Debug, Clone)]
pub struct ResolverState {
    pub version: u64,
    pub config: DnsConfig,
    pub blocked: BlockedDomains,
    pub supported: SupportedProtocols,
}

impl ResolverState {
    pub fn new(config: DnsConfig) -> Self {
        Self::with_version(config, 1)
    }

    fn with_version(config: DnsConfig, version: u64) -> Self {
        Self {
            version,
            blocked: BlockedDomains::new(config.security.blocked_domains.clone()),
            supported: SupportedProtocols::from_config(&config),
            config,
        }
    }

    pub fn shared(config: DnsConfig) -> SharedResolverState {
        Arc::new(ArcSwap::from_pointee(Self::new(config)))
    }

    /// Successor snapshot built from an edited copy of this one's configuration.
    pub fn next(&self, config: DnsConfig) -> Self {
        Self::with_version(config, self.version + 1)
    }

    pub fn is_supported(&self, protocol: Protocol) -> bool {
        self.supported.get(protocol)
    }
}
