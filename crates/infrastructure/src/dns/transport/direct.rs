use super::reporter::AttemptReporter;
use super::udp;
use crate::dns::wire::{decode_answer, encode_query, message_id};
use polydns_application::ports::UpstreamQuery;
use polydns_domain::{DnsRecord, DomainError, Protocol};
use std::time::Instant;
use tracing::debug;

/// Plain DNS over UDP to a caller-chosen server.
pub struct DirectClient {
    reporter: AttemptReporter,
}

impl DirectClient {
    pub fn new(reporter: AttemptReporter) -> Self {
        Self { reporter }
    }

    pub async fn query(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let started = Instant::now();
        let server = query.endpoint.authority();

        let outcome = self.exchange(query).await;
        if let Ok(records) = &outcome {
            debug!(
                server = %server,
                domain = %query.domain,
                answers = records.len(),
                "Direct query answered"
            );
        }

        self.reporter
            .report(Protocol::Custom.log_source(), query, &server, started, &outcome);
        outcome
    }

    async fn exchange(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let server_addr = udp::resolve_endpoint(&query.endpoint).await?;
        let message = encode_query(&query.domain, query.record_type)?;
        let response = udp::exchange(server_addr, &message, query.endpoint.timeout).await?;
        decode_answer(message_id(&message), &response, &query.domain).map(|a| a.records)
    }
}
