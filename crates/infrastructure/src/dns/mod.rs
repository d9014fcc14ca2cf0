pub mod cache;
pub mod server;
pub mod transport;
pub mod wire;

pub use cache::{CacheMetrics, CacheStore};
pub use server::{DnsServerHandler, UdpListener};
pub use transport::{AttemptReporter, SystemClient, UpstreamRegistry};
