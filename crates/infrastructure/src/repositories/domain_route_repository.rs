use arc_swap::ArcSwap;
use fancy_regex::Regex;
use polydns_application::ports::DomainRoutePort;
use polydns_domain::DomainRoute;
use std::sync::Arc;
use tracing::{debug, warn};

/// One label: one or more non-dot characters.
const LABEL_PATTERN: &str = "[^.]+";

struct CompiledRoute {
    route: DomainRoute,
    pattern: String,
    /// `None` for patterns without a wildcard, which only match exactly.
    matcher: Option<Regex>,
}

impl CompiledRoute {
    fn compile(route: DomainRoute) -> Self {
        let pattern = route.pattern.trim().to_lowercase();
        let matcher = if pattern.contains('*') {
            match wildcard_regex(&pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Route pattern kept as exact match");
                    None
                }
            }
        } else {
            None
        };
        Self {
            route,
            pattern,
            matcher,
        }
    }

    fn matches(&self, domain: &str) -> bool {
        if self.pattern == domain {
            return true;
        }
        self.matcher
            .as_ref()
            .is_some_and(|regex| regex.is_match(domain).unwrap_or(false))
    }
}

/// First-match-wins lookup over the current route snapshot, in file order.
pub struct DomainRouteRepository {
    routes: ArcSwap<Vec<CompiledRoute>>,
}

impl DomainRouteRepository {
    pub fn new(routes: Vec<DomainRoute>) -> Self {
        Self {
            routes: ArcSwap::from_pointee(compile_all(routes)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainRoutePort for DomainRouteRepository {
    fn find(&self, domain: &str) -> Option<DomainRoute> {
        let domain = domain.trim().trim_end_matches('.').to_lowercase();
        let routes = self.routes.load();
        let found = routes.iter().find(|r| r.matches(&domain))?;
        debug!(domain = %domain, pattern = %found.pattern, "Route matched");
        Some(found.route.clone())
    }

    fn replace(&self, routes: Vec<DomainRoute>) {
        let compiled = compile_all(routes);
        debug!(count = compiled.len(), "Route snapshot replaced");
        self.routes.store(Arc::new(compiled));
    }

    fn routes(&self) -> Vec<DomainRoute> {
        self.routes.load().iter().map(|r| r.route.clone()).collect()
    }
}

/// Case-insensitive pattern test. Exact equality wins outright; each `*`
/// stands for exactly one label, so `*.example.com` does not match
/// `example.com` or `a.b.example.com`.
pub fn match_domain(pattern: &str, domain: &str) -> bool {
    CompiledRoute::compile(DomainRoute {
        pattern: pattern.to_string(),
        server: None,
        protocol: polydns_domain::Protocol::Standard,
        label: None,
    })
    .matches(&domain.trim().to_lowercase())
}

fn compile_all(routes: Vec<DomainRoute>) -> Vec<CompiledRoute> {
    routes.into_iter().map(CompiledRoute::compile).collect()
}

fn wildcard_regex(pattern: &str) -> Result<Regex, fancy_regex::Error> {
    let body = pattern
        .split('*')
        .map(|part| fancy_regex::escape(part).into_owned())
        .collect::<Vec<_>>()
        .join(LABEL_PATTERN);
    Regex::new(&format!("^{}$", body))
}
