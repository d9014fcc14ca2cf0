mod resolver_state;

pub use resolver_state::{ResolverState, SharedResolverState, SupportedProtocols};
