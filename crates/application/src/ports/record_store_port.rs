use polydns_domain::{CustomRecord, CustomRecordSpec, DomainError, RecordType};

#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: Vec<(CustomRecordSpec, DomainError)>,
}

/// Authoritative custom records keyed by `(domain, type)`.
pub trait RecordStorePort: Send + Sync {
    fn add_record(
        &self,
        domain: &str,
        record_type: RecordType,
        value: &str,
        ttl: Option<u32>,
        priority: Option<u16>,
    ) -> Result<CustomRecord, DomainError>;

    /// Updates every record whose value equals `old_value`.
    fn update_record(
        &self,
        domain: &str,
        record_type: RecordType,
        old_value: &str,
        new_value: &str,
        ttl: Option<u32>,
        priority: Option<u16>,
    ) -> Result<bool, DomainError>;

    fn delete_record(
        &self,
        domain: &str,
        record_type: Option<RecordType>,
        value: Option<&str>,
    ) -> usize;

    fn get_records(&self, domain: &str, record_type: Option<RecordType>) -> Vec<CustomRecord>;

    fn import_records(&self, records: Vec<CustomRecordSpec>) -> ImportSummary;

    fn export_records(&self) -> Vec<CustomRecordSpec>;
}
