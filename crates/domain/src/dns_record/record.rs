use super::RecordType;
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// TTL applied when a source does not report one.
pub const DEFAULT_TTL: u32 = 300;

pub const CLASS_IN: u16 = 1;

/// Type-specific payload of a resolved record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordData {
    /// A / AAAA
    Address(IpAddr),
    Mail { priority: u16, exchange: String },
    /// TXT character-strings in wire order
    Text(Vec<String>),
    /// NS / CNAME / PTR target
    Name(String),
    /// Anything without a dedicated shape (SOA, SRV)
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub ttl: u32,
    pub class: u16,
    pub data: RecordData,
}

impl DnsRecord {
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        data: RecordData,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            class: CLASS_IN,
            data,
        }
    }

    pub fn address(name: impl Into<String>, address: IpAddr, ttl: u32) -> Self {
        let record_type = if address.is_ipv4() {
            RecordType::A
        } else {
            RecordType::AAAA
        };
        Self::new(name, record_type, ttl, RecordData::Address(address))
    }

    pub fn mail(
        name: impl Into<String>,
        priority: u16,
        exchange: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self::new(
            name,
            RecordType::MX,
            ttl,
            RecordData::Mail {
                priority,
                exchange: exchange.into(),
            },
        )
    }

    pub fn text(name: impl Into<String>, entries: Vec<String>, ttl: u32) -> Self {
        Self::new(name, RecordType::TXT, ttl, RecordData::Text(entries))
    }

    pub fn target(
        name: impl Into<String>,
        record_type: RecordType,
        target: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self::new(name, record_type, ttl, RecordData::Name(target.into()))
    }

    /// Builds a record from its textual value, as stored by the record store or
    /// reported by JSON resolvers.
    pub fn from_value(
        name: &str,
        record_type: RecordType,
        value: &str,
        ttl: u32,
        priority: Option<u16>,
    ) -> Result<Self, DomainError> {
        let data = match record_type {
            RecordType::A | RecordType::AAAA => {
                let address: IpAddr = value.trim().parse().map_err(|_| {
                    DomainError::Validation(format!(
                        "'{}' is not a valid address for a {} record",
                        value, record_type
                    ))
                })?;
                if address.is_ipv4() != (record_type == RecordType::A) {
                    return Err(DomainError::Validation(format!(
                        "'{}' does not match record type {}",
                        value, record_type
                    )));
                }
                RecordData::Address(address)
            }
            RecordType::MX => RecordData::Mail {
                priority: priority.unwrap_or(10),
                exchange: value.to_string(),
            },
            RecordType::TXT => RecordData::Text(vec![value.to_string()]),
            RecordType::NS | RecordType::CNAME | RecordType::PTR => {
                RecordData::Name(value.to_string())
            }
            RecordType::SOA | RecordType::SRV => RecordData::Raw(value.to_string()),
        };
        Ok(Self::new(name, record_type, ttl, data))
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match &self.data {
            RecordData::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Textual value of the payload: address, exchange, joined TXT entries or target.
    pub fn value(&self) -> String {
        match &self.data {
            RecordData::Address(addr) => addr.to_string(),
            RecordData::Mail { exchange, .. } => exchange.clone(),
            RecordData::Text(entries) => entries.join(""),
            RecordData::Name(target) | RecordData::Raw(target) => target.clone(),
        }
    }

    pub fn priority(&self) -> Option<u16> {
        match &self.data {
            RecordData::Mail { priority, .. } => Some(*priority),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_rejects_family_mismatch() {
        let err = DnsRecord::from_value("a.test", RecordType::A, "::1", 60, None).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_from_value_mx_defaults_priority() {
        let record =
            DnsRecord::from_value("a.test", RecordType::MX, "mx.a.test", 60, None).unwrap();
        assert_eq!(record.priority(), Some(10));
        assert_eq!(record.value(), "mx.a.test");
    }
}
