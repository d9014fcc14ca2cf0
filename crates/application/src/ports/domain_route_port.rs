use polydns_domain::DomainRoute;

pub trait DomainRoutePort: Send + Sync {
    /// First matching rule in snapshot order.
    fn find(&self, domain: &str) -> Option<DomainRoute>;

    fn replace(&self, routes: Vec<DomainRoute>);

    fn routes(&self) -> Vec<DomainRoute>;
}
