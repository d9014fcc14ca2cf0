use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
}

/// Name and wire code per variant, in declaration order.
static TYPE_TABLE: [(RecordType, &str, u16); 9] = [
    (RecordType::A, "A", 1),
    (RecordType::NS, "NS", 2),
    (RecordType::CNAME, "CNAME", 5),
    (RecordType::SOA, "SOA", 6),
    (RecordType::PTR, "PTR", 12),
    (RecordType::MX, "MX", 15),
    (RecordType::TXT, "TXT", 16),
    (RecordType::AAAA, "AAAA", 28),
    (RecordType::SRV, "SRV", 33),
];

impl RecordType {
    /// Types that can be removed from the cache when no type is given.
    pub const CACHEABLE: [RecordType; 9] = [
        RecordType::A,
        RecordType::AAAA,
        RecordType::MX,
        RecordType::TXT,
        RecordType::NS,
        RecordType::CNAME,
        RecordType::PTR,
        RecordType::SOA,
        RecordType::SRV,
    ];

    pub fn as_str(&self) -> &'static str {
        self.entry().1
    }

    pub fn to_u16(&self) -> u16 {
        self.entry().2
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        TYPE_TABLE
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(t, _, _)| *t)
    }

    fn entry(&self) -> &'static (RecordType, &'static str, u16) {
        // Every variant has a row.
        &TYPE_TABLE[*self as usize]
    }

    /// Lenient name lookup used on the query path: unknown names resolve to `A`.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or(RecordType::A)
    }

    /// Lenient code lookup used on the query path: unknown codes resolve to `A`.
    pub fn from_code_or_default(code: u16) -> Self {
        Self::from_u16(code).unwrap_or(RecordType::A)
    }

    /// Whether the authoritative record store accepts this type.
    pub fn is_custom_record_type(&self) -> bool {
        matches!(
            self,
            RecordType::A
                | RecordType::AAAA
                | RecordType::CNAME
                | RecordType::MX
                | RecordType::TXT
                | RecordType::NS
        )
    }

    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::AAAA)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        TYPE_TABLE
            .iter()
            .find(|(_, n, _)| n.eq_ignore_ascii_case(name))
            .map(|(t, _, _)| *t)
            .ok_or_else(|| format!("Unknown record type: {}", s))
    }
}

impl TryFrom<String> for RecordType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}
