//! DNS message encoding and decoding shared by every wire-speaking transport
//! and by the UDP listener.

pub mod manual_parser;
pub mod query;
pub mod response_parser;
pub mod server_message;

pub use query::{encode_query, encode_query_with_id};
pub use server_message::{encode_format_error, encode_response, parse_query, InboundQuery};

use polydns_domain::{DnsRecord, DomainError};
use tracing::debug;

const RCODE_NOERROR: u8 = 0;
const RCODE_NXDOMAIN: u8 = 3;

#[derive(Debug, Clone)]
pub struct DecodedResponse {
    pub id: u16,
    pub rcode: u8,
    pub truncated: bool,
    pub answers: Vec<DnsRecord>,
    /// Set when the structured parser rejected the message.
    pub manual: bool,
}

/// Records of an accepted response and which parser produced them.
#[derive(Debug, Clone)]
pub struct Answer {
    pub records: Vec<DnsRecord>,
    pub manual: bool,
}

impl DecodedResponse {
    /// Answer records for a NOERROR response (possibly empty), NxDomain for
    /// NXDOMAIN, a protocol error for any other response code.
    pub fn into_records(self, domain: &str) -> Result<Vec<DnsRecord>, DomainError> {
        match self.rcode {
            RCODE_NOERROR => Ok(self.answers),
            RCODE_NXDOMAIN => Err(DomainError::NxDomain(domain.to_string())),
            other => Err(DomainError::UpstreamProtocol(format!(
                "Server answered {} for {}",
                rcode_name(other),
                domain
            ))),
        }
    }
}

/// Structured decode first; the manual parser only runs when the structured
/// one rejects the message.
pub fn decode_response(bytes: &[u8]) -> Result<DecodedResponse, DomainError> {
    match response_parser::parse(bytes) {
        Ok(decoded) => Ok(decoded),
        Err(structured) => {
            debug!(error = %structured, "Structured parse failed, trying manual parser");
            manual_parser::parse(bytes).map_err(|_| structured)
        }
    }
}

/// Decodes a response, checks its id against the query and maps the rcode.
pub fn decode_answer(
    expected_id: Option<u16>,
    bytes: &[u8],
    domain: &str,
) -> Result<Answer, DomainError> {
    let decoded = decode_response(bytes)?;
    if let Some(expected) = expected_id {
        if decoded.id != expected {
            return Err(DomainError::UpstreamProtocol(format!(
                "Response id {} does not match query id {}",
                decoded.id, expected
            )));
        }
    }
    let manual = decoded.manual;
    decoded
        .into_records(domain)
        .map(|records| Answer { records, manual })
}

/// Query id carried in the first two bytes of an encoded message.
pub fn message_id(bytes: &[u8]) -> Option<u16> {
    bytes.get(0..2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

pub fn rcode_name(rcode: u8) -> &'static str {
    match rcode {
        0 => "NOERROR",
        1 => "FORMERR",
        2 => "SERVFAIL",
        3 => "NXDOMAIN",
        4 => "NOTIMP",
        5 => "REFUSED",
        _ => "UNKNOWN",
    }
}
