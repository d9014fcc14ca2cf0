use super::{DnsServices, Repositories};
use polydns_application::use_cases::{ConnectionDiagnosticsUseCase, ReloadConfigUseCase};
use polydns_domain::Config;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub struct UseCases {
    pub reload: Arc<ReloadConfigUseCase>,
    pub diagnostics: Arc<ConnectionDiagnosticsUseCase>,
}

impl UseCases {
    pub fn new(config: &Config, repos: &Repositories, dns: &DnsServices) -> Self {
        let reload = Arc::new(ReloadConfigUseCase::new(
            dns.state.clone(),
            dns.cache.clone(),
            repos.query_log.clone(),
            repos.routes.clone(),
            config,
        ));

        if let Some(file) = &config.dns.custom_domains_file {
            if let Err(e) = reload.reload_routes(Path::new(file)) {
                warn!(file = %file, error = %e, "Starting without domain routes");
            }
        }

        let diagnostics = Arc::new(ConnectionDiagnosticsUseCase::new(
            dns.state.clone(),
            dns.upstream.clone(),
            dns.upstream.clone(),
        ));

        Self {
            reload,
            diagnostics,
        }
    }
}
