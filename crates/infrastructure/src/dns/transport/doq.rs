//! DNS-over-QUIC placeholder.
//!
//! No QUIC stack is linked in: when the capability switch is on, queries are
//! answered by the system resolver and logged as simulated DoQ; when it is
//! off, the attempt fails so the engine falls back.

use super::reporter::AttemptReporter;
use super::system::SystemClient;
use polydns_application::ports::{ServerAvailability, UpstreamQuery};
use polydns_application::services::SharedResolverState;
use polydns_domain::{DnsRecord, DomainError, LogSource};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const QUIC_PROTOCOL: &str = "QUIC";

pub struct DoqStub {
    system: Arc<SystemClient>,
    state: SharedResolverState,
    reporter: AttemptReporter,
}

impl DoqStub {
    pub fn new(
        system: Arc<SystemClient>,
        state: SharedResolverState,
        reporter: AttemptReporter,
    ) -> Self {
        Self {
            system,
            state,
            reporter,
        }
    }

    fn quic_supported(&self) -> bool {
        self.state.load().config.protocols.doq.quic_supported
    }

    pub async fn query(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let started = Instant::now();
        let server = query.endpoint.authority();

        if !self.quic_supported() {
            let outcome = Err(DomainError::UnsupportedProtocol(
                "DoQ requires QUIC support, which is disabled".to_string(),
            ));
            self.reporter
                .report(LogSource::Doq, query, &server, started, &outcome);
            return outcome;
        }

        debug!(
            domain = %query.domain,
            server = %server,
            "DoQ simulated through the system resolver"
        );
        let outcome = self.system.resolve(query).await;
        self.reporter
            .report(LogSource::DoqSimulated, query, &server, started, &outcome);
        outcome
    }

    /// QUIC reachability is never tested; the report says so.
    pub fn availability(&self, host: &str, port: u16) -> ServerAvailability {
        let message = if self.quic_supported() {
            "QUIC probing is not implemented, DoQ queries are simulated"
        } else {
            "QUIC support is disabled"
        };
        ServerAvailability {
            host: host.to_string(),
            port,
            available: false,
            protocol: QUIC_PROTOCOL.to_string(),
            message: message.to_string(),
        }
    }
}
