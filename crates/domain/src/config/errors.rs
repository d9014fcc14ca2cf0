use crate::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to write {0}: {1}")]
    FileWrite(String, String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl From<ConfigError> for DomainError {
    fn from(error: ConfigError) -> Self {
        DomainError::Config(error.to_string())
    }
}
