mod custom_record;
mod record;
mod record_type;

pub use custom_record::{CustomRecord, CustomRecordSpec};
pub use record::{DnsRecord, RecordData, CLASS_IN, DEFAULT_TTL};
pub use record_type::RecordType;
