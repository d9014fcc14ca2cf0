use super::engine::{ResolutionEngine, DEFAULT_CLIENT_IP};
use polydns_domain::{DnsRecord, DomainError, RecordData, RecordType, CLASS_IN, DEFAULT_TTL};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::{debug, error};

/// Decoded question handed over by the listener.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub name: String,
    pub qtype: u16,
    pub client_ip: Option<IpAddr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    NxDomain,
    ServFail,
}

impl ResponseCode {
    pub fn to_u8(self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::ServFail => 2,
            ResponseCode::NxDomain => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub rcode: ResponseCode,
    pub answers: Vec<DnsRecord>,
}

impl QueryResponse {
    fn empty(rcode: ResponseCode) -> Self {
        Self {
            rcode,
            answers: Vec::new(),
        }
    }
}

impl ResolutionEngine {
    /// Listener entry point: applies domain route overrides, resolves, and
    /// shapes the answers for encoding. Never fails; unresolved errors become
    /// a response code.
    pub async fn handle_query(&self, request: &QueryRequest) -> QueryResponse {
        let record_type = RecordType::from_code_or_default(request.qtype);
        let client_ip = request.client_ip.unwrap_or(DEFAULT_CLIENT_IP);

        let route = self.routes.find(&request.name);
        if let Some(route) = &route {
            debug!(
                domain = %request.name,
                pattern = %route.pattern,
                protocol = %route.protocol,
                server = ?route.server,
                "Domain route matched"
            );
        }
        let protocol = route.as_ref().map(|r| r.protocol);
        let server = route.as_ref().and_then(|r| r.server.as_deref());

        match self
            .lookup(&request.name, record_type, client_ip, protocol, server)
            .await
        {
            Ok(records) => QueryResponse {
                rcode: ResponseCode::NoError,
                answers: records
                    .iter()
                    .filter_map(|r| answer_for(r, &request.name, record_type))
                    .collect(),
            },
            Err(e) if e.is_no_record() => QueryResponse::empty(ResponseCode::NoError),
            Err(DomainError::NxDomain(name)) => {
                debug!(domain = %name, "NXDOMAIN");
                QueryResponse::empty(ResponseCode::NxDomain)
            }
            Err(e) => {
                error!(
                    domain = %request.name,
                    record_type = %record_type,
                    error = %e,
                    "Query failed"
                );
                QueryResponse::empty(ResponseCode::ServFail)
            }
        }
    }
}

/// Maps a resolved record onto the per-type answer shape, filling the listener
/// defaults: owner name from the question, class IN, ttl 300, unspecified
/// address, MX preference 10. Types without a wire shape are dropped.
pub fn answer_for(record: &DnsRecord, qname: &str, qtype: RecordType) -> Option<DnsRecord> {
    let name = if record.name.is_empty() {
        qname.to_string()
    } else {
        record.name.clone()
    };
    let class = if record.class == 0 {
        CLASS_IN
    } else {
        record.class
    };
    let ttl = if record.ttl == 0 {
        DEFAULT_TTL
    } else {
        record.ttl
    };

    let data = match (record.record_type, &record.data) {
        (RecordType::A | RecordType::AAAA, RecordData::Address(addr)) => {
            RecordData::Address(*addr)
        }
        (RecordType::A, _) => RecordData::Address(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        (RecordType::AAAA, _) => RecordData::Address(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
        (RecordType::MX, RecordData::Mail { priority, exchange }) => RecordData::Mail {
            priority: *priority,
            exchange: exchange.clone(),
        },
        (RecordType::MX, _) => RecordData::Mail {
            priority: 10,
            exchange: record.value(),
        },
        (RecordType::TXT, RecordData::Text(entries)) => RecordData::Text(entries.clone()),
        (RecordType::TXT, _) => RecordData::Text(vec![record.value()]),
        (RecordType::NS | RecordType::CNAME | RecordType::PTR, _) => {
            RecordData::Name(record.value())
        }
        _ => {
            debug!(record_type = %record.record_type, qtype = %qtype, "No answer shape, dropped");
            return None;
        }
    };

    Some(DnsRecord {
        name,
        record_type: record.record_type,
        ttl,
        class,
        data,
    })
}
