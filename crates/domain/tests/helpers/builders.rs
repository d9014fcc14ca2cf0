#![allow(dead_code)]
use polydns_domain::{DnsRecord, LogEntry, LogSource, QueryEvent, RecordType};
use std::net::IpAddr;

pub struct QueryEventBuilder {
    domain: String,
    record_type: RecordType,
    client_ip: IpAddr,
    source: LogSource,
    error: Option<String>,
    results: Vec<DnsRecord>,
}

impl QueryEventBuilder {
    pub fn new() -> Self {
        Self {
            domain: "example.com".to_string(),
            record_type: RecordType::A,
            client_ip: "192.168.1.100".parse().unwrap(),
            source: LogSource::System,
            error: None,
            results: Vec::new(),
        }
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    pub fn client_ip(mut self, ip: &str) -> Self {
        self.client_ip = ip.parse().unwrap();
        self
    }

    pub fn source(mut self, source: LogSource) -> Self {
        self.source = source;
        self
    }

    pub fn failed(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn result(mut self, record: DnsRecord) -> Self {
        self.results.push(record);
        self
    }

    pub fn build(self) -> QueryEvent {
        match self.error {
            Some(error) => QueryEvent::failure(
                self.source,
                &self.domain,
                self.record_type,
                self.client_ip,
                error,
            ),
            None => QueryEvent::success(
                self.source,
                &self.domain,
                self.record_type,
                self.client_ip,
                self.results,
            ),
        }
    }

    pub fn entry(self) -> LogEntry {
        LogEntry::new(self.build())
    }
}

impl Default for QueryEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
