use super::DecodedResponse;
use hickory_proto::op::Message;
use hickory_proto::rr::{RData, Record};
use polydns_domain::{DnsRecord, DomainError, RecordData, RecordType};
use std::net::IpAddr;
use tracing::debug;

/// Structured decode through hickory-proto. Answers of types the resolver
/// does not model are dropped.
pub fn parse(response_bytes: &[u8]) -> Result<DecodedResponse, DomainError> {
    let message = Message::from_vec(response_bytes).map_err(|e| {
        DomainError::UpstreamProtocol(format!("Failed to parse DNS response: {}", e))
    })?;

    let answers: Vec<DnsRecord> = message.answers().iter().filter_map(convert).collect();

    debug!(
        rcode = ?message.response_code(),
        answers = answers.len(),
        truncated = message.truncated(),
        "DNS response parsed"
    );

    Ok(DecodedResponse {
        id: response_bytes
            .get(0..2)
            .map_or(0, |b| u16::from_be_bytes([b[0], b[1]])),
        rcode: u16::from(message.response_code()) as u8,
        truncated: message.truncated(),
        answers,
        manual: false,
    })
}

fn convert(record: &Record) -> Option<DnsRecord> {
    let record_type = RecordType::from_u16(u16::from(record.record_type()))?;

    let data = match record.data() {
        RData::A(a) => RecordData::Address(IpAddr::V4(a.0)),
        RData::AAAA(aaaa) => RecordData::Address(IpAddr::V6(aaaa.0)),
        RData::CNAME(target) => RecordData::Name(fqdn_to_name(&target.to_utf8())),
        RData::NS(target) => RecordData::Name(fqdn_to_name(&target.to_utf8())),
        RData::PTR(target) => RecordData::Name(fqdn_to_name(&target.to_utf8())),
        RData::MX(mx) => RecordData::Mail {
            priority: mx.preference(),
            exchange: fqdn_to_name(&mx.exchange().to_utf8()),
        },
        RData::TXT(txt) => RecordData::Text(vec![txt.to_string()]),
        other => RecordData::Raw(other.to_string()),
    };

    Some(DnsRecord::new(
        fqdn_to_name(&record.name().to_utf8()),
        record_type,
        record.ttl(),
        data,
    ))
}

fn fqdn_to_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}
