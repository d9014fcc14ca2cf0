use polydns_application::ports::{QueryLogPort, UpstreamQuery};
use polydns_domain::{DnsRecord, DomainError, LogSource, QueryEvent};
use std::sync::Arc;
use std::time::Instant;

/// Writes one query-log entry per transport attempt, independent of the
/// engine's own decision-level entries.
#[derive(Clone)]
pub struct AttemptReporter {
    sink: Arc<dyn QueryLogPort>,
}

impl AttemptReporter {
    pub fn new(sink: Arc<dyn QueryLogPort>) -> Self {
        Self { sink }
    }

    pub fn report(
        &self,
        source: LogSource,
        query: &UpstreamQuery,
        server: &str,
        started: Instant,
        outcome: &Result<Vec<DnsRecord>, DomainError>,
    ) {
        let event = match outcome {
            Ok(records) if records.is_empty() => self.no_record_event(source, query),
            Ok(records) => QueryEvent::success(
                source,
                &query.domain,
                query.record_type,
                query.client_ip,
                records.clone(),
            ),
            Err(e) if e.is_no_record() => self.no_record_event(source, query),
            Err(e) => QueryEvent::failure(
                source,
                &query.domain,
                query.record_type,
                query.client_ip,
                e,
            ),
        };

        self.sink
            .add_log(event.with_server(server).with_response_time(started.elapsed()));
    }

    fn no_record_event(&self, source: LogSource, query: &UpstreamQuery) -> QueryEvent {
        QueryEvent::success(
            source,
            &query.domain,
            query.record_type,
            query.client_ip,
            Vec::new(),
        )
        .with_message(format!("No {} record available", query.record_type))
    }
}
