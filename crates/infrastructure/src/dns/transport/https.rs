//! DNS-over-HTTPS client (RFC 8484) plus the JSON `/resolve` variant.
//!
//! Wire format (HTTP):
//! ```text
//! GET  /dns-query?dns=<base64url query, no padding>
//! POST /dns-query          Content-Type: application/dns-message
//! GET  /resolve?name=<domain>&type=<TYPE>   Accept: application/json
//! ```

use super::reporter::AttemptReporter;
use crate::dns::wire::{decode_answer, encode_query, message_id, Answer};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use polydns_application::ports::UpstreamQuery;
use polydns_domain::config::HttpMethod;
use polydns_domain::{DnsRecord, DomainError, LogSource, Protocol, RecordType};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Expected content type for DNS-over-HTTPS responses (RFC 8484 §4.2.1)
pub const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";
const DNS_JSON_CONTENT_TYPE: &str = "application/json";
const JSON_RESOLVE_PATH: &str = "/resolve";
const JSON_STATUS_NXDOMAIN: u32 = 3;

pub struct DohClient {
    reporter: AttemptReporter,
    client: reqwest::Client,
}

impl DohClient {
    pub fn new(reporter: AttemptReporter) -> Self {
        Self {
            reporter,
            client: SHARED_CLIENT.clone(),
        }
    }

    /// Endpoints whose path is a `/resolve` route speak JSON; everything else
    /// carries wire-format messages.
    pub fn is_json_endpoint(path: &str) -> bool {
        path.trim_end_matches('/').ends_with(JSON_RESOLVE_PATH)
    }

    pub async fn query(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        if Self::is_json_endpoint(&query.endpoint.path) {
            return self.query_json(query).await;
        }

        let started = Instant::now();
        let url = query.endpoint.doh_url();

        let (source, outcome) = match self.exchange(query, &url).await {
            Ok(answer) if answer.manual => (LogSource::DohManual, Ok(answer.records)),
            Ok(answer) => (Protocol::Doh.log_source(), Ok(answer.records)),
            Err(e) => (Protocol::Doh.log_source(), Err(e)),
        };

        self.reporter.report(source, query, &url, started, &outcome);
        outcome
    }

    pub async fn query_json(&self, query: &UpstreamQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let started = Instant::now();
        let url = query.endpoint.doh_url();

        let outcome = self.exchange_json(query, &url).await;

        self.reporter
            .report(LogSource::DohJson, query, &url, started, &outcome);
        outcome
    }

    async fn exchange(&self, query: &UpstreamQuery, url: &str) -> Result<Answer, DomainError> {
        let message = encode_query(&query.domain, query.record_type)?;
        let timeout = query.endpoint.timeout;

        let request = match query.endpoint.method {
            HttpMethod::Post => self
                .client
                .post(url)
                .header(CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
                .body(message.clone()),
            HttpMethod::Get => self
                .client
                .get(format!("{}?dns={}", url, URL_SAFE_NO_PAD.encode(&message))),
        }
        .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE);

        debug!(
            url = %url,
            method = ?query.endpoint.method,
            message_len = message.len(),
            "Sending DoH query"
        );

        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| DomainError::timeout(url))?
            .map_err(|e| DomainError::transport(url, format!("request failed: {}", e)))?;

        check_status(&response, url)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with(DNS_MESSAGE_CONTENT_TYPE) {
            return Err(DomainError::UpstreamProtocol(format!(
                "DoH server {} returned content type '{}'",
                url, content_type
            )));
        }

        let body = tokio::time::timeout(timeout, response.bytes())
            .await
            .map_err(|_| DomainError::timeout(url))?
            .map_err(|e| DomainError::transport(url, format!("failed to read body: {}", e)))?;

        debug!(url = %url, response_len = body.len(), "DoH response received");

        decode_answer(message_id(&message), &body, &query.domain)
    }

    async fn exchange_json(
        &self,
        query: &UpstreamQuery,
        url: &str,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let timeout = query.endpoint.timeout;
        let request = self
            .client
            .get(url)
            .query(&[
                ("name", query.domain.as_str()),
                ("type", query.record_type.as_str()),
            ])
            .header(ACCEPT, DNS_JSON_CONTENT_TYPE);

        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| DomainError::timeout(url))?
            .map_err(|e| DomainError::transport(url, format!("request failed: {}", e)))?;

        check_status(&response, url)?;

        let body: JsonResponse = tokio::time::timeout(timeout, response.json())
            .await
            .map_err(|_| DomainError::timeout(url))?
            .map_err(|e| DomainError::UpstreamProtocol(format!("invalid JSON answer: {}", e)))?;

        body.into_records(&query.domain)
    }
}

fn check_status(response: &reqwest::Response, url: &str) -> Result<(), DomainError> {
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(DomainError::transport(
            url,
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        ));
    }
    Ok(())
}

/// JSON resolve answer, as served by Google and Cloudflare style endpoints.
#[derive(Debug, Deserialize)]
pub struct JsonResponse {
    #[serde(rename = "Status")]
    pub status: u32,
    #[serde(rename = "Answer", default)]
    pub answer: Vec<JsonAnswer>,
}

#[derive(Debug, Deserialize)]
pub struct JsonAnswer {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: u16,
    #[serde(rename = "TTL", default)]
    pub ttl: u32,
    pub data: String,
}

impl JsonResponse {
    pub fn into_records(self, domain: &str) -> Result<Vec<DnsRecord>, DomainError> {
        match self.status {
            0 => Ok(self.answer.iter().filter_map(JsonAnswer::to_record).collect()),
            JSON_STATUS_NXDOMAIN => Err(DomainError::NxDomain(domain.to_string())),
            other => Err(DomainError::UpstreamProtocol(format!(
                "JSON resolver answered status {} for {}",
                other, domain
            ))),
        }
    }
}

impl JsonAnswer {
    fn to_record(&self) -> Option<DnsRecord> {
        let record_type = RecordType::from_u16(self.record_type)?;
        let name = self.name.trim_end_matches('.');
        let data = self.data.trim();

        let (value, priority) = match record_type {
            RecordType::MX => {
                let (priority, exchange) = data.split_once(' ')?;
                (exchange.trim_end_matches('.'), priority.parse().ok())
            }
            RecordType::TXT => (data.trim_matches('"'), None),
            RecordType::CNAME | RecordType::NS | RecordType::PTR => {
                (data.trim_end_matches('.'), None)
            }
            _ => (data, None),
        };

        DnsRecord::from_value(name, record_type, value, self.ttl, priority).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_endpoint_detection() {
        assert!(DohClient::is_json_endpoint("/resolve"));
        assert!(DohClient::is_json_endpoint("/dns/resolve/"));
        assert!(!DohClient::is_json_endpoint("/dns-query"));
    }

    #[test]
    fn test_json_answer_mapping() {
        let body: JsonResponse = serde_json::from_str(
            r#"{"Status":0,"Answer":[
                {"name":"example.com.","type":5,"TTL":60,"data":"alias.example.net."},
                {"name":"alias.example.net.","type":1,"TTL":30,"data":"192.0.2.1"},
                {"name":"example.com.","type":15,"TTL":300,"data":"20 mx.example.com."},
                {"name":"example.com.","type":16,"TTL":300,"data":"\"v=spf1 -all\""},
                {"name":"example.com.","type":99,"TTL":300,"data":"ignored"}
            ]}"#,
        )
        .unwrap();

        let records = body.into_records("example.com").unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].value(), "alias.example.net");
        assert_eq!(records[1].ip(), Some("192.0.2.1".parse().unwrap()));
        assert_eq!(records[2].priority(), Some(20));
        assert_eq!(records[3].value(), "v=spf1 -all");
    }

    #[test]
    fn test_json_nxdomain_status() {
        let body: JsonResponse = serde_json::from_str(r#"{"Status":3}"#).unwrap();
        let err = body.into_records("missing.example").unwrap_err();
        assert!(matches!(err, DomainError::NxDomain(_)));
    }
}
