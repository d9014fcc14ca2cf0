use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported record type: {0}")]
    UnsupportedRecordType(String),

    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Upstream answered successfully but carried no record of the requested type.
    #[error("No {record_type} record available for {domain}")]
    NoRecordAvailable { domain: String, record_type: String },

    #[error("Domain not found (NXDOMAIN): {0}")]
    NxDomain(String),

    #[error("Upstream timeout waiting for {server}")]
    UpstreamTimeout { server: String },

    #[error("Upstream transport error with {server}: {reason}")]
    UpstreamTransport { server: String, reason: String },

    #[error("Upstream protocol error: {0}")]
    UpstreamProtocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Stable machine-readable discriminator, paired with the Display message
    /// when errors are handed to API-style callers.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::UnsupportedRecordType(_) => "unsupported_record_type",
            DomainError::UnsupportedProtocol(_) => "unsupported_protocol",
            DomainError::NoRecordAvailable { .. } => "no_record_available",
            DomainError::NxDomain(_) => "nx_domain",
            DomainError::UpstreamTimeout { .. } => "upstream_timeout",
            DomainError::UpstreamTransport { .. } => "upstream_transport",
            DomainError::UpstreamProtocol(_) => "upstream_protocol",
            DomainError::Config(_) => "config",
        }
    }

    pub fn is_no_record(&self) -> bool {
        matches!(self, DomainError::NoRecordAvailable { .. })
    }

    pub fn no_record(domain: &str, record_type: impl ToString) -> Self {
        DomainError::NoRecordAvailable {
            domain: domain.to_string(),
            record_type: record_type.to_string(),
        }
    }

    pub fn transport(server: impl ToString, reason: impl ToString) -> Self {
        DomainError::UpstreamTransport {
            server: server.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn timeout(server: impl ToString) -> Self {
        DomainError::UpstreamTimeout {
            server: server.to_string(),
        }
    }
}

/// Serializable view of a [`DomainError`] for JSON-speaking callers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl From<&DomainError> for ErrorReport {
    fn from(error: &DomainError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
