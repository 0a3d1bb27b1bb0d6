//! Port types and the lenient port-set parser.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortList` turns specifications such as `"22,80,8000-8100"` into a sorted,
//! deduplicated port list, silently dropping anything it cannot use.

use super::Parsed;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Create a Port from a wider integer, returning None when out of range.
    #[inline]
    pub fn from_i64(value: i64) -> Option<Self> {
        u16::try_from(value).ok().and_then(Self::new)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Best-effort parser for comma-separated port specifications.
///
/// Each element is either a single number or `start-end`. Non-numeric
/// tokens, reversed ranges and values outside 1-65535 are dropped. A range
/// that only partly overlaps the valid span keeps its in-range ports.
pub struct PortList;

impl PortList {
    /// Parse a specification, reporting tokens that yielded no port.
    pub fn parse(spec: &str) -> Parsed<Port> {
        let mut ports = BTreeSet::new();
        let mut ignored = Vec::new();

        for token in spec.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let mut contributed = false;

            if token.contains('-') {
                let mut bounds = token.split('-');
                let start = bounds.next().and_then(|s| s.trim().parse::<i64>().ok());
                let end = bounds.next().and_then(|s| s.trim().parse::<i64>().ok());

                if let (Some(start), Some(end)) = (start, end) {
                    let lo = start.max(Port::MIN as i64);
                    let hi = end.min(Port::MAX as i64);
                    if lo <= hi {
                        ports.extend((lo..=hi).filter_map(Port::from_i64));
                        contributed = true;
                    }
                }
            } else if let Some(port) = token.parse::<i64>().ok().and_then(Port::from_i64) {
                ports.insert(port);
                contributed = true;
            }

            if !contributed {
                ignored.push(token.to_string());
            }
        }

        Parsed {
            items: ports.into_iter().collect(),
            ignored,
        }
    }
}

/// Parse a port specification into an ascending, duplicate-free list.
///
/// Malformed tokens are silently dropped; an empty result is not an error.
pub fn parse_ports(spec: &str) -> Vec<Port> {
    PortList::parse(spec).items
}

/// Named port sets for common scan scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PortPreset {
    /// The twenty most commonly exposed ports
    Common,
    /// HTTP(S) and typical web application ports
    Web,
    /// Database and cache servers
    Database,
    /// Every port in the service table
    AllCommon,
}

impl PortPreset {
    /// The port specification this preset expands to.
    pub const fn spec(self) -> &'static str {
        match self {
            Self::Common => {
                "21,22,23,25,53,80,110,135,139,143,443,445,993,995,1433,3306,3389,5432,8080,8443"
            }
            Self::Web => "80,443,8080,8443,8000,8888,9000,9090",
            Self::Database => "1433,1434,3306,5432,5433,6379,27017,9200,11211",
            Self::AllCommon => {
                "21,22,23,25,53,67,68,69,80,110,111,119,123,135,137,138,139,143,161,162,389,443,\
                 445,465,500,514,515,520,587,636,993,995,1080,1433,1434,1521,1723,2049,3306,3389,\
                 3690,4443,5060,5061,5432,5900,5985,5986,6379,8000,8080,8443,9000,9090,9200,11211,\
                 27017"
            }
        }
    }

    /// Parsed ports for this preset.
    pub fn ports(self) -> Vec<Port> {
        parse_ports(self.spec())
    }
}

impl fmt::Display for PortPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => write!(f, "common"),
            Self::Web => write!(f, "web"),
            Self::Database => write!(f, "database"),
            Self::AllCommon => write!(f, "all-common"),
        }
    }
}
