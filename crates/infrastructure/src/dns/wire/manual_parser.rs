//! Best-effort response decoder used when the structured parser rejects a
//! message. Only A and AAAA answers are extracted; every other answer is
//! skipped by its RDLENGTH.

use super::query::HEADER_LEN;
use super::DecodedResponse;
use polydns_domain::{DnsRecord, DomainError, RecordType};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Upper bound on pointer hops while reading one name.
const MAX_POINTER_HOPS: usize = 32;

pub fn parse(buf: &[u8]) -> Result<DecodedResponse, DomainError> {
    if buf.len() < HEADER_LEN {
        return Err(malformed(format!(
            "response shorter than header ({} bytes)",
            buf.len()
        )));
    }

    let id = read_u16(buf, 0)?;
    let flags = read_u16(buf, 2)?;
    let qdcount = read_u16(buf, 4)?;
    let ancount = read_u16(buf, 6)?;

    let mut pos = HEADER_LEN;
    for _ in 0..qdcount {
        pos = skip_name(buf, pos)?;
        pos += 4;
    }

    let mut answers = Vec::with_capacity(ancount as usize);
    for _ in 0..ancount {
        let (name, after_name) = read_name(buf, pos)?;
        pos = after_name;

        let rtype = read_u16(buf, pos)?;
        let class = read_u16(buf, pos + 2)?;
        let ttl = read_u32(buf, pos + 4)?;
        let rdlength = read_u16(buf, pos + 8)? as usize;
        pos += 10;

        let rdata = buf
            .get(pos..pos + rdlength)
            .ok_or_else(|| malformed("RDATA runs past end of message"))?;
        pos += rdlength;

        let address = match (RecordType::from_u16(rtype), rdata.len()) {
            (Some(RecordType::A), 4) => {
                IpAddr::V4(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3]))
            }
            (Some(RecordType::AAAA), 16) => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(rdata);
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            _ => continue,
        };

        let mut record = DnsRecord::address(name, address, ttl);
        record.class = class;
        answers.push(record);
    }

    Ok(DecodedResponse {
        id,
        rcode: (flags & 0x000f) as u8,
        truncated: flags & 0x0200 != 0,
        answers,
        manual: true,
    })
}

/// Returns the offset just past the name at `pos`. A pointer (two high bits
/// set) always ends the name after its second byte.
fn skip_name(buf: &[u8], mut pos: usize) -> Result<usize, DomainError> {
    loop {
        let len = *buf
            .get(pos)
            .ok_or_else(|| malformed("name runs past end of message"))?;
        if len & 0xC0 == 0xC0 {
            return Ok(pos + 2);
        }
        if len == 0 {
            return Ok(pos + 1);
        }
        pos += 1 + len as usize;
    }
}

/// Reads the dotted name at `start`, following compression pointers. The
/// returned offset points past the name where it first appeared, not past
/// any pointer target.
fn read_name(buf: &[u8], start: usize) -> Result<(String, usize), DomainError> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = start;
    let mut resume: Option<usize> = None;
    let mut hops = 0;

    loop {
        let len = *buf
            .get(pos)
            .ok_or_else(|| malformed("name runs past end of message"))?;

        if len & 0xC0 == 0xC0 {
            let low = *buf
                .get(pos + 1)
                .ok_or_else(|| malformed("truncated compression pointer"))?;
            hops += 1;
            if hops > MAX_POINTER_HOPS {
                return Err(malformed("compression pointer loop"));
            }
            resume.get_or_insert(pos + 2);
            pos = (((len & 0x3F) as usize) << 8) | low as usize;
            continue;
        }

        if len == 0 {
            let end = resume.unwrap_or(pos + 1);
            return Ok((labels.join("."), end));
        }

        let label = buf
            .get(pos + 1..pos + 1 + len as usize)
            .ok_or_else(|| malformed("label runs past end of message"))?;
        labels.push(String::from_utf8_lossy(label).to_string());
        pos += 1 + len as usize;
    }
}

fn read_u16(buf: &[u8], pos: usize) -> Result<u16, DomainError> {
    buf.get(pos..pos + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| malformed("message truncated"))
}

fn read_u32(buf: &[u8], pos: usize) -> Result<u32, DomainError> {
    buf.get(pos..pos + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| malformed("message truncated"))
}

fn malformed(reason: impl Into<String>) -> DomainError {
    DomainError::UpstreamProtocol(format!("Malformed DNS response: {}", reason.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_name_resolves_to_question() {
        let mut msg = vec![0x00, 0x01, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0];
        msg.extend_from_slice(b"\x03www\x07example\x03com\x00\x00\x01\x00\x01");
        msg.extend_from_slice(&[0xc0, 0x0c, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4, 10, 0, 0, 1]);

        let decoded = parse(&msg).unwrap();
        assert_eq!(decoded.answers.len(), 1);
        assert_eq!(decoded.answers[0].name, "www.example.com");
        assert_eq!(decoded.answers[0].ttl, 60);
    }

    #[test]
    fn test_pointer_loop_is_rejected() {
        let mut msg = vec![0x00, 0x01, 0x81, 0x80, 0, 0, 0, 1, 0, 0, 0, 0];
        msg.extend_from_slice(&[0xc0, 0x0c]);
        assert!(parse(&msg).is_err());
    }

    #[test]
    fn test_short_message_rejected() {
        let err = parse(&[0x00, 0x01]).unwrap_err();
        assert_eq!(err.kind(), "upstream_protocol");
    }
}
