use crate::dns_protocol::LogSource;
use crate::dns_record::{DnsRecord, RecordType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// A single resolution attempt as reported by a pipeline stage or transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvent {
    pub domain: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub client_ip: IpAddr,
    pub source: LogSource,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<DnsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryEvent {
    pub fn success(
        source: LogSource,
        domain: &str,
        record_type: RecordType,
        client_ip: IpAddr,
        results: Vec<DnsRecord>,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            record_type,
            client_ip,
            source,
            success: true,
            results,
            error: None,
            response_time_ms: 0,
            server: None,
            message: None,
        }
    }

    pub fn failure(
        source: LogSource,
        domain: &str,
        record_type: RecordType,
        client_ip: IpAddr,
        error: impl ToString,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            record_type,
            client_ip,
            source,
            success: false,
            results: Vec::new(),
            error: Some(error.to_string()),
            response_time_ms: 0,
            server: None,
            message: None,
        }
    }

    pub fn with_response_time(mut self, elapsed: Duration) -> Self {
        self.response_time_ms = elapsed.as_millis() as u64;
        self
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Stored log record: the reported event plus the id and timestamp assigned on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: QueryEvent,
}

impl LogEntry {
    pub fn new(event: QueryEvent) -> Self {
        let timestamp = Utc::now();
        let millis = timestamp.timestamp_millis().max(0) as u64;
        Self {
            id: millis * 1000 + fastrand::u64(0..1000),
            timestamp,
            event,
        }
    }
}

/// Criteria for `filter_logs`. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Case-insensitive substring of the domain.
    pub domain: Option<String>,
    pub record_type: Option<RecordType>,
    /// Substring of the client address.
    pub client_ip: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub success: Option<bool>,
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        let event = &entry.event;

        if let Some(domain) = &self.domain {
            if !event
                .domain
                .to_lowercase()
                .contains(&domain.to_lowercase())
            {
                return false;
            }
        }
        if let Some(record_type) = self.record_type {
            if event.record_type != record_type {
                return false;
            }
        }
        if let Some(client_ip) = &self.client_ip {
            if !event.client_ip.to_string().contains(client_ip.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if entry.timestamp > end {
                return false;
            }
        }
        if let Some(success) = self.success {
            if event.success != success {
                return false;
            }
        }
        true
    }
}
