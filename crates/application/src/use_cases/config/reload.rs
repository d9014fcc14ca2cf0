use crate::ports::{DnsCachePort, DomainRoutePort, QueryLogPort};
use crate::services::{ResolverState, SharedResolverState, SupportedProtocols};
use arc_swap::ArcSwap;
use polydns_domain::config::{validate_allowed_ips, GeneralConfig, ServerConfig};
use polydns_domain::{CacheOptions, Config, DnsConfig, DomainError, RouteFile};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Hot reload of individual configuration concerns. Every method derives a
/// new resolver snapshot from a freshly loaded [`Config`] and swaps it in;
/// queries already in flight keep the snapshot they started with.
pub struct ReloadConfigUseCase {
    state: SharedResolverState,
    cache: Arc<dyn DnsCachePort>,
    query_log: Arc<dyn QueryLogPort>,
    routes: Arc<dyn DomainRoutePort>,
    server: ArcSwap<ServerConfig>,
    general: ArcSwap<GeneralConfig>,
}

impl ReloadConfigUseCase {
    pub fn new(
        state: SharedResolverState,
        cache: Arc<dyn DnsCachePort>,
        query_log: Arc<dyn QueryLogPort>,
        routes: Arc<dyn DomainRoutePort>,
        initial: &Config,
    ) -> Self {
        Self {
            state,
            cache,
            query_log,
            routes,
            server: ArcSwap::from_pointee(initial.server.clone()),
            general: ArcSwap::from_pointee(initial.general.clone()),
        }
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server.load_full()
    }

    pub fn general_config(&self) -> Arc<GeneralConfig> {
        self.general.load_full()
    }

    /// Loads and validates `path`, then applies every concern.
    pub fn reload_from_file(&self, path: &str) -> Result<Config, DomainError> {
        let config = Config::from_file(path)?;
        config.validate()?;
        self.reload_all(&config)?;
        info!(path = %path, "Configuration reloaded");
        Ok(config)
    }

    pub fn reload_all(&self, source: &Config) -> Result<(), DomainError> {
        self.reload_upstream_servers(source);
        self.reload_security_settings(source)?;
        self.reload_logging(source);
        self.reload_cache(source);
        self.reload_dns_server_config(source);
        self.reload_general_config(source);

        let routes_file = source.dns.custom_domains_file.clone();
        self.swap(|config| config.custom_domains_file = routes_file.clone());
        if let Some(file) = routes_file {
            if let Err(e) = self.reload_routes(Path::new(&file)) {
                warn!(file = %file, error = %e, "Keeping previous domain routes");
            }
        }
        Ok(())
    }

    pub fn reload_blocked_domains(&self, source: &Config) {
        let blocked = source.dns.security.blocked_domains.clone();
        let count = blocked.len();
        self.swap(|config| config.security.blocked_domains = blocked.clone());
        info!(count, "Blocked domains reloaded");
    }

    pub fn reload_allowed_ips(&self, source: &Config) -> Result<(), DomainError> {
        let allowed = source.dns.security.allowed_ips.clone();
        validate_allowed_ips(&allowed)?;
        let count = allowed.len();
        self.swap(|config| config.security.allowed_ips = allowed.clone());
        info!(count, "Allowed IP ranges reloaded");
        Ok(())
    }

    pub fn reload_rate_limit(&self, source: &Config) {
        let rate_limit = source.dns.security.rate_limit;
        self.swap(|config| config.security.rate_limit = rate_limit);
        info!(
            enable = rate_limit.enable,
            threshold = rate_limit.threshold,
            "Rate limit settings reloaded"
        );
    }

    pub fn reload_dnssec(&self, source: &Config) {
        let dnssec = source.dns.security.dnssec;
        self.swap(|config| config.security.dnssec = dnssec);
        info!(enable = dnssec.enable, "DNSSEC setting reloaded");
    }

    pub fn reload_security_settings(&self, source: &Config) -> Result<(), DomainError> {
        self.reload_allowed_ips(source)?;
        self.reload_blocked_domains(source);
        self.reload_rate_limit(source);
        self.reload_dnssec(source);
        Ok(())
    }

    /// Debug flag and query-log policy; the policy is pushed into the log sink.
    pub fn reload_logging(&self, source: &Config) {
        let debug_enabled = source.dns.debug;
        let policy = source.dns.query_log.clone();
        self.swap(|config| {
            config.debug = debug_enabled;
            config.query_log = policy.clone();
        });
        self.query_log.set_policy(policy.clone());
        info!(
            debug_enabled,
            log_queries = policy.log_queries,
            log_responses = policy.log_responses,
            level = %policy.level,
            "Logging settings reloaded"
        );
    }

    /// Protocol enable flags, server lists and timeouts, plus default protocol
    /// and fallback order. Supported protocols are recomputed.
    pub fn reload_upstream_servers(&self, source: &Config) -> SupportedProtocols {
        let dns = &source.dns;
        let next = self.swap(|config| {
            config.protocols = dns.protocols.clone();
            config.default_protocol = dns.default_protocol;
            config.fallback_order = dns.fallback_order.clone();
        });
        info!(
            default_protocol = %next.config.default_protocol,
            supported = ?next.supported,
            "Upstream servers reloaded"
        );
        next.supported
    }

    pub fn reload_cache(&self, source: &Config) {
        let cache = source.dns.cache.clone();
        self.cache.configure(CacheOptions {
            enable: Some(cache.enable),
            ttl: Some(cache.ttl),
            max_size: Some(cache.max_size),
        });
        self.swap(|config| config.cache = cache.clone());
        info!(
            enable = cache.enable,
            ttl = cache.ttl,
            max_size = cache.max_size,
            "Cache settings reloaded"
        );
    }

    /// Returns true when the bind address or port changed, which only takes
    /// effect once the listener is restarted.
    pub fn reload_dns_server_config(&self, source: &Config) -> bool {
        let previous = self.server.swap(Arc::new(source.server.clone()));
        let rebind = previous.bind_address != source.server.bind_address
            || previous.dns_port != source.server.dns_port;
        if rebind {
            warn!(
                bind = %source.server.bind_address,
                port = source.server.dns_port,
                "Listener address changed, restart required to rebind"
            );
        } else {
            info!("DNS server settings reloaded");
        }
        rebind
    }

    pub fn reload_general_config(&self, source: &Config) {
        self.general.store(Arc::new(source.general.clone()));
        info!(keys = source.general.len(), "General settings reloaded");
    }

    /// Replaces the domain route snapshot from a route file.
    pub fn reload_routes(&self, path: &Path) -> Result<usize, DomainError> {
        let routes = RouteFile::load(path)?.into_routes();
        let count = routes.len();
        self.routes.replace(routes);
        info!(path = %path.display(), count, "Domain routes reloaded");
        Ok(count)
    }

    fn swap(&self, edit: impl Fn(&mut DnsConfig)) -> Arc<ResolverState> {
        self.state.rcu(|current| {
            let mut config = current.config.clone();
            edit(&mut config);
            Arc::new(current.next(config))
        });
        self.state.load_full()
    }
}
