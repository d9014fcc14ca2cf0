use polydns_domain::{DomainError, RecordType, CLASS_IN};

pub(crate) const HEADER_LEN: usize = 12;
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

/// Recursion desired, nothing else.
const QUERY_FLAGS: u16 = 0x0100;

/// Builds a single-question recursive query with a random id.
pub fn encode_query(domain: &str, record_type: RecordType) -> Result<Vec<u8>, DomainError> {
    encode_query_with_id(fastrand::u16(..), domain, record_type)
}

pub fn encode_query_with_id(
    id: u16,
    domain: &str,
    record_type: RecordType,
) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(HEADER_LEN + domain.len() + 6);

    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&QUERY_FLAGS.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    push_name(&mut buf, domain)?;

    buf.extend_from_slice(&record_type.to_u16().to_be_bytes());
    buf.extend_from_slice(&CLASS_IN.to_be_bytes());

    Ok(buf)
}

/// Appends `name` as length-prefixed labels and the terminating zero byte.
/// A trailing dot is accepted; the root name encodes as a single zero byte.
pub(crate) fn push_name(buf: &mut Vec<u8>, name: &str) -> Result<(), DomainError> {
    let name = name.trim().trim_end_matches('.');
    if name.len() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "Domain name too long: {} bytes (max {})",
            name.len(),
            MAX_NAME_LEN
        )));
    }

    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(DomainError::Validation(format!(
                    "Invalid label '{}' in domain '{}'",
                    label, name
                )));
            }
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
    }
    buf.push(0x00);

    Ok(())
}
