//! polydns infrastructure: transports, wire codec, cache and in-memory stores.
pub mod dns;
pub mod repositories;
pub mod system;
