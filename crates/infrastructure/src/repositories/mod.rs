pub mod domain_route_repository;
pub mod query_log_repository;
pub mod record_repository;

pub use domain_route_repository::{match_domain, DomainRouteRepository};
pub use query_log_repository::{InMemoryQueryLog, DEFAULT_LOG_CAPACITY};
pub use record_repository::InMemoryRecordRepository;
