use super::{DnsRecord, RecordType};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authoritative record held by the record store. Never expires on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRecord {
    pub domain: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: String,
    pub ttl: u32,
    /// Only carried by MX records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomRecord {
    pub fn new(
        domain: &str,
        record_type: RecordType,
        value: &str,
        ttl: u32,
        priority: u16,
    ) -> Result<Self, DomainError> {
        if domain.trim().is_empty() {
            return Err(DomainError::Validation("domain must not be empty".into()));
        }
        if value.trim().is_empty() {
            return Err(DomainError::Validation("value must not be empty".into()));
        }
        if !record_type.is_custom_record_type() {
            return Err(DomainError::UnsupportedRecordType(format!(
                "{} cannot be stored as a custom record",
                record_type
            )));
        }

        let domain = domain.trim().to_lowercase();
        // validates the value shape (A/AAAA addresses)
        DnsRecord::from_value(&domain, record_type, value, ttl, Some(priority))?;

        let now = Utc::now();
        Ok(Self {
            domain,
            record_type,
            value: value.to_string(),
            ttl,
            priority: (record_type == RecordType::MX).then_some(priority),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn to_dns_record(&self) -> Result<DnsRecord, DomainError> {
        DnsRecord::from_value(
            &self.domain,
            self.record_type,
            &self.value,
            self.ttl,
            self.priority,
        )
    }
}

/// Import/export shape of a custom record; `type` is kept as free text so a
/// batch can carry entries that fail validation individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRecordSpec {
    pub domain: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub priority: Option<u16>,
}

impl From<&CustomRecord> for CustomRecordSpec {
    fn from(record: &CustomRecord) -> Self {
        Self {
            domain: record.domain.clone(),
            record_type: record.record_type.to_string(),
            value: record.value.clone(),
            ttl: Some(record.ttl),
            priority: record.priority,
        }
    }
}
