use chrono::Utc;
use compact_str::CompactString;
use dashmap::DashMap;
use polydns_application::ports::{ImportSummary, RecordStorePort};
use polydns_domain::{CustomRecord, CustomRecordSpec, DnsRecord, DomainError, RecordType};
use tracing::{debug, info, warn};

const DEFAULT_RECORD_TTL: u32 = 300;
const DEFAULT_MX_PRIORITY: u16 = 10;

/// Types accepted by the store, in export order.
const STORED_TYPES: [RecordType; 6] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::TXT,
    RecordType::NS,
];

type RecordKey = (CompactString, RecordType);

/// Operator-managed records, answered ahead of cache and upstream. A key may
/// hold several values, duplicates included.
#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: DashMap<RecordKey, Vec<CustomRecord>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(domain: &str, record_type: RecordType) -> RecordKey {
        (CompactString::from(domain.trim().to_lowercase()), record_type)
    }
}

impl RecordStorePort for InMemoryRecordRepository {
    fn add_record(
        &self,
        domain: &str,
        record_type: RecordType,
        value: &str,
        ttl: Option<u32>,
        priority: Option<u16>,
    ) -> Result<CustomRecord, DomainError> {
        let record = CustomRecord::new(
            domain,
            record_type,
            value,
            ttl.unwrap_or(DEFAULT_RECORD_TTL),
            priority.unwrap_or(DEFAULT_MX_PRIORITY),
        )?;

        self.records
            .entry(Self::key(&record.domain, record_type))
            .or_default()
            .push(record.clone());

        debug!(
            domain = %record.domain,
            record_type = %record_type,
            value = %record.value,
            "Custom record added"
        );
        Ok(record)
    }

    fn update_record(
        &self,
        domain: &str,
        record_type: RecordType,
        old_value: &str,
        new_value: &str,
        ttl: Option<u32>,
        priority: Option<u16>,
    ) -> Result<bool, DomainError> {
        if new_value.trim().is_empty() {
            return Err(DomainError::Validation("value must not be empty".into()));
        }
        DnsRecord::from_value(domain, record_type, new_value, DEFAULT_RECORD_TTL, priority)?;

        let Some(mut records) = self.records.get_mut(&Self::key(domain, record_type)) else {
            return Ok(false);
        };

        let now = Utc::now();
        let mut updated = 0usize;
        for record in records.iter_mut().filter(|r| r.value == old_value) {
            record.value = new_value.to_string();
            if let Some(ttl) = ttl {
                record.ttl = ttl;
            }
            if record_type == RecordType::MX {
                if let Some(priority) = priority {
                    record.priority = Some(priority);
                }
            }
            record.updated_at = now;
            updated += 1;
        }

        if updated > 0 {
            debug!(domain = %domain, record_type = %record_type, updated, "Custom records updated");
        }
        Ok(updated > 0)
    }

    fn delete_record(
        &self,
        domain: &str,
        record_type: Option<RecordType>,
        value: Option<&str>,
    ) -> usize {
        let removed = match (record_type, value) {
            (None, _) => STORED_TYPES
                .iter()
                .filter_map(|t| self.records.remove(&Self::key(domain, *t)))
                .map(|(_, records)| records.len())
                .sum(),
            (Some(record_type), None) => self
                .records
                .remove(&Self::key(domain, record_type))
                .map_or(0, |(_, records)| records.len()),
            (Some(record_type), Some(value)) => {
                let key = Self::key(domain, record_type);
                let removed = match self.records.get_mut(&key) {
                    Some(mut records) => {
                        let before = records.len();
                        records.retain(|r| r.value != value);
                        before - records.len()
                    }
                    None => 0,
                };
                self.records.remove_if(&key, |_, records| records.is_empty());
                removed
            }
        };

        if removed > 0 {
            debug!(domain = %domain, record_type = ?record_type, removed, "Custom records deleted");
        }
        removed
    }

    fn get_records(&self, domain: &str, record_type: Option<RecordType>) -> Vec<CustomRecord> {
        match record_type {
            Some(record_type) => self
                .records
                .get(&Self::key(domain, record_type))
                .map(|records| records.clone())
                .unwrap_or_default(),
            None => STORED_TYPES
                .iter()
                .filter_map(|t| self.records.get(&Self::key(domain, *t)))
                .flat_map(|records| records.clone())
                .collect(),
        }
    }

    fn import_records(&self, records: Vec<CustomRecordSpec>) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for spec in records {
            let outcome = spec
                .record_type
                .parse::<RecordType>()
                .map_err(DomainError::UnsupportedRecordType)
                .and_then(|record_type| {
                    self.add_record(&spec.domain, record_type, &spec.value, spec.ttl, spec.priority)
                });

            match outcome {
                Ok(_) => summary.imported += 1,
                Err(e) => {
                    warn!(
                        domain = %spec.domain,
                        record_type = %spec.record_type,
                        error = %e,
                        "Skipping record on import"
                    );
                    summary.failed.push((spec, e));
                }
            }
        }

        info!(
            imported = summary.imported,
            failed = summary.failed.len(),
            "Custom records imported"
        );
        summary
    }

    fn export_records(&self) -> Vec<CustomRecordSpec> {
        let mut exported: Vec<CustomRecordSpec> = self
            .records
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(CustomRecordSpec::from)
                    .collect::<Vec<_>>()
            })
            .collect();
        exported.sort_by(|a, b| (&a.domain, &a.record_type).cmp(&(&b.domain, &b.record_type)));
        exported
    }
}
