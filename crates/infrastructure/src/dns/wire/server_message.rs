use super::query::{push_name, HEADER_LEN};
use polydns_domain::{DnsRecord, DomainError, RecordData, RecordType, CLASS_IN};
use std::net::IpAddr;

pub const RCODE_FORMERR: u8 = 1;

const MAX_CHARACTER_STRING: usize = 255;

/// Question decoded from an inbound query datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundQuery {
    pub id: u16,
    pub recursion_desired: bool,
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
    /// Byte offset where the question section ends.
    pub question_end: usize,
}

/// Parses the first question of a query. Rejects responses, non-QUERY
/// opcodes, an empty question section and compressed question names.
pub fn parse_query(buf: &[u8]) -> Result<InboundQuery, DomainError> {
    if buf.len() < HEADER_LEN {
        return Err(formerr("query shorter than header"));
    }

    let id = u16::from_be_bytes([buf[0], buf[1]]);
    let flags = u16::from_be_bytes([buf[2], buf[3]]);
    let qdcount = u16::from_be_bytes([buf[4], buf[5]]);

    if flags & 0x8000 != 0 {
        return Err(formerr("QR bit set"));
    }
    if flags & 0x7800 != 0 {
        return Err(formerr("unsupported opcode"));
    }
    if qdcount == 0 {
        return Err(formerr("no question"));
    }

    let mut labels: Vec<String> = Vec::new();
    let mut pos = HEADER_LEN;
    loop {
        let len = *buf.get(pos).ok_or_else(|| formerr("question truncated"))? as usize;
        if len == 0 {
            pos += 1;
            break;
        }
        if len & 0xC0 != 0 {
            return Err(formerr("compressed question name"));
        }
        let label = buf
            .get(pos + 1..pos + 1 + len)
            .ok_or_else(|| formerr("label truncated"))?;
        labels.push(String::from_utf8_lossy(label).to_ascii_lowercase());
        pos += 1 + len;
    }

    let trailer = buf
        .get(pos..pos + 4)
        .ok_or_else(|| formerr("question type missing"))?;
    let qtype = u16::from_be_bytes([trailer[0], trailer[1]]);
    let qclass = u16::from_be_bytes([trailer[2], trailer[3]]);

    Ok(InboundQuery {
        id,
        recursion_desired: flags & 0x0100 != 0,
        name: labels.join("."),
        qtype,
        qclass,
        question_end: pos + 4,
    })
}

/// Encodes a response echoing the question from `query_buf`. Answers whose
/// data does not fit their type are skipped.
pub fn encode_response(
    query: &InboundQuery,
    query_buf: &[u8],
    rcode: u8,
    answers: &[DnsRecord],
) -> Vec<u8> {
    let question = query_buf.get(HEADER_LEN..query.question_end).unwrap_or(&[]);

    let mut body = Vec::with_capacity(128);
    let mut ancount: u16 = 0;
    for record in answers {
        if encode_answer(&mut body, record, &query.name).is_ok() {
            ancount += 1;
        }
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + question.len() + body.len());
    buf.extend_from_slice(&query.id.to_be_bytes());
    buf.push(0x80 | if query.recursion_desired { 0x01 } else { 0x00 });
    buf.push(0x80 | (rcode & 0x0f));
    buf.extend_from_slice(&(if question.is_empty() { 0u16 } else { 1u16 }).to_be_bytes());
    buf.extend_from_slice(&ancount.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    buf.extend_from_slice(question);
    buf.extend_from_slice(&body);
    buf
}

/// FORMERR reply for a datagram that could not be parsed. Needs at least the
/// two id bytes.
pub fn encode_format_error(query_buf: &[u8]) -> Option<Vec<u8>> {
    let id = query_buf.get(0..2)?;
    let mut buf = Vec::with_capacity(HEADER_LEN);
    buf.extend_from_slice(id);
    buf.push(0x80);
    buf.push(0x80 | RCODE_FORMERR);
    buf.extend_from_slice(&[0; 8]);
    Some(buf)
}

fn encode_answer(buf: &mut Vec<u8>, record: &DnsRecord, qname: &str) -> Result<(), DomainError> {
    let mut rdata = Vec::with_capacity(32);
    match (record.record_type, &record.data) {
        (RecordType::A, RecordData::Address(IpAddr::V4(v4))) => {
            rdata.extend_from_slice(&v4.octets())
        }
        (RecordType::AAAA, RecordData::Address(IpAddr::V6(v6))) => {
            rdata.extend_from_slice(&v6.octets())
        }
        (RecordType::MX, RecordData::Mail { priority, exchange }) => {
            rdata.extend_from_slice(&priority.to_be_bytes());
            push_name(&mut rdata, exchange)?;
        }
        (RecordType::TXT, RecordData::Text(entries)) => {
            for entry in entries {
                for chunk in entry.as_bytes().chunks(MAX_CHARACTER_STRING) {
                    rdata.push(chunk.len() as u8);
                    rdata.extend_from_slice(chunk);
                }
                if entry.is_empty() {
                    rdata.push(0);
                }
            }
        }
        (RecordType::NS | RecordType::CNAME | RecordType::PTR, RecordData::Name(target)) => {
            push_name(&mut rdata, target)?;
        }
        _ => {
            return Err(DomainError::UnsupportedRecordType(
                record.record_type.to_string(),
            ))
        }
    }

    let rdlength = u16::try_from(rdata.len()).map_err(|_| {
        DomainError::Validation(format!(
            "{} record for {} has {} bytes of RDATA",
            record.record_type,
            record.name,
            rdata.len()
        ))
    })?;

    // Owner name goes into a scratch buffer so a failed name leaves `buf` untouched.
    let mut owner = Vec::with_capacity(16);
    if record.name.eq_ignore_ascii_case(qname) {
        owner.extend_from_slice(&[0xC0, 0x0C]);
    } else {
        push_name(&mut owner, &record.name)?;
    }
    buf.extend_from_slice(&owner);
    buf.extend_from_slice(&record.record_type.to_u16().to_be_bytes());
    let class = if record.class == 0 { CLASS_IN } else { record.class };
    buf.extend_from_slice(&class.to_be_bytes());
    buf.extend_from_slice(&record.ttl.to_be_bytes());
    buf.extend_from_slice(&rdlength.to_be_bytes());
    buf.extend_from_slice(&rdata);
    Ok(())
}

fn formerr(reason: &str) -> DomainError {
    DomainError::Validation(format!("Malformed DNS query: {}", reason))
}
