use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;

const LOCAL_CONFIG_PATH: &str = "polydns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/polydns/config.toml";

/// Free-form `[general]` table, reloadable as a whole.
pub type GeneralConfig = BTreeMap<String, toml::Value>;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Listener settings (bind address, port, transports)
    #[serde(default)]
    pub server: ServerConfig,

    /// Operator log output
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub general: GeneralConfig,

    /// Resolution engine configuration
    #[serde(default)]
    pub dns: DnsConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. polydns.toml in current directory
    /// 3. /etc/polydns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path.or_else(|| Self::get_config_path()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.dns.cache.max_size == 0 {
            return Err(ConfigError::Validation(
                "cache max_size must be at least 1".to_string(),
            ));
        }

        if self.dns.cache.cleanup_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "cache cleanup_interval_secs must be at least 1".to_string(),
            ));
        }

        validate_allowed_ips(&self.dns.security.allowed_ips)?;

        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<&'static str> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|p| Path::new(p).exists())
    }
}

/// Every entry must be CIDR notation or a bare address.
pub fn validate_allowed_ips(entries: &[String]) -> Result<(), ConfigError> {
    for entry in entries {
        entry.trim().parse::<IpNetwork>().map_err(|e| {
            ConfigError::Validation(format!("allowed_ips entry '{}': {}", entry, e))
        })?;
    }
    Ok(())
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
