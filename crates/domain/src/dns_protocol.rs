use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resolution protocols the engine can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Protocol {
    /// Operating-system resolver
    Standard,
    /// Plain DNS to a caller-chosen server
    Custom,
    Dot,
    Doh,
    Doq,
}

impl Protocol {
    pub const ALL: [Protocol; 5] = [
        Protocol::Standard,
        Protocol::Custom,
        Protocol::Dot,
        Protocol::Doh,
        Protocol::Doq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Standard => "standard",
            Protocol::Custom => "custom",
            Protocol::Dot => "dot",
            Protocol::Doh => "doh",
            Protocol::Doq => "doq",
        }
    }

    /// Log tag written when this protocol's client reports an attempt.
    pub fn log_source(&self) -> LogSource {
        match self {
            Protocol::Standard => LogSource::System,
            Protocol::Custom => LogSource::Direct,
            Protocol::Dot => LogSource::Dot,
            Protocol::Doh => LogSource::Doh,
            Protocol::Doq => LogSource::Doq,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Protocol::Standard),
            "custom" => Ok(Protocol::Custom),
            "dot" => Ok(Protocol::Dot),
            "doh" => Ok(Protocol::Doh),
            "doq" => Ok(Protocol::Doq),
            other => Err(format!("Unknown protocol '{}'", other)),
        }
    }
}

impl TryFrom<String> for Protocol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Protocol> for String {
    fn from(value: Protocol) -> Self {
        value.as_str().to_string()
    }
}

/// Stage or transport that produced a query-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSource {
    Custom,
    Cache,
    Blocked,
    System,
    Direct,
    Dot,
    Doh,
    Doq,
    DoqSimulated,
    DotManual,
    DohManual,
    DohJson,
    Error,
    /// Upstream answer record; governed by the response logging switch.
    Response,
}

impl LogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::Custom => "custom",
            LogSource::Cache => "cache",
            LogSource::Blocked => "blocked",
            LogSource::System => "system",
            LogSource::Direct => "direct",
            LogSource::Dot => "dot",
            LogSource::Doh => "doh",
            LogSource::Doq => "doq",
            LogSource::DoqSimulated => "doq-simulated",
            LogSource::DotManual => "dot-manual",
            LogSource::DohManual => "doh-manual",
            LogSource::DohJson => "doh-json",
            LogSource::Error => "error",
            LogSource::Response => "response",
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
