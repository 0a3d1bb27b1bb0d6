//! Scanner trait abstraction and the result types it produces.
//!
//! Defines a common interface for the TCP and UDP probe implementations,
//! enabling the orchestrator to dispatch work items without caring how a
//! probe is carried out, and letting tests substitute their own probers.

use crate::services::get_service_description;
use crate::types::Port;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Transport used for a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Status a probe reports before its attempt has produced an answer.
    ///
    /// TCP assumes closed; UDP assumes the ambiguous open|filtered.
    pub const fn initial_status(self) -> PortStatus {
        match self {
            Self::Tcp => PortStatus::Closed,
            Self::Udp => PortStatus::OpenFiltered,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

/// Protocol selection for a whole scan.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScanProtocol {
    /// TCP connect probes only
    #[default]
    Tcp,
    /// Single-datagram UDP probes only
    Udp,
    /// Both TCP and UDP for every target and port
    Both,
}

impl ScanProtocol {
    /// Concrete protocols this selection expands to, TCP first.
    pub fn protocols(self) -> &'static [Protocol] {
        match self {
            Self::Tcp => &[Protocol::Tcp],
            Self::Udp => &[Protocol::Udp],
            Self::Both => &[Protocol::Tcp, Protocol::Udp],
        }
    }
}

impl fmt::Display for ScanProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
            Self::Both => write!(f, "TCP+UDP"),
        }
    }
}

impl std::str::FromStr for ScanProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "both" | "all" => Ok(Self::Both),
            _ => Err(format!("unknown protocol: {}", s)),
        }
    }
}

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// Port is open (connection accepted or datagram answered).
    Open,
    /// Port is closed (connection refused or ICMP port unreachable).
    Closed,
    /// No definitive answer before the timeout, likely dropped by a firewall.
    Filtered,
    /// UDP silence: open without replying, or filtered.
    #[serde(rename = "open|filtered")]
    OpenFiltered,
    /// The probe itself failed for a reason unrelated to the port.
    Error,
}

impl PortStatus {
    /// Whether this status counts as open for reporting and hostname lookup.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::OpenFiltered)
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::OpenFiltered => write!(f, "open|filtered"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One concrete probe unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub target: String,
    pub port: Port,
    pub protocol: Protocol,
}

impl WorkItem {
    pub fn new(target: impl Into<String>, port: Port, protocol: Protocol) -> Self {
        Self {
            target: target.into(),
            port,
            protocol,
        }
    }
}

/// Result of probing a single (target, port, protocol) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Target exactly as produced by target expansion.
    pub target: String,
    /// Reverse-resolved name; `None` when unresolved, identical to the target, or not looked up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// The port that was probed.
    pub port: Port,
    /// Transport used for the probe.
    pub protocol: Protocol,
    /// Classified outcome.
    pub status: PortStatus,
    /// Service label from the well-known port table.
    pub service: String,
    /// When the probe completed.
    pub timestamp: DateTime<Utc>,
}

impl ScanResult {
    /// Create a result with the protocol's initial status and the service label filled in.
    pub fn new(target: impl Into<String>, port: Port, protocol: Protocol) -> Self {
        Self {
            target: target.into(),
            hostname: None,
            port,
            protocol,
            status: protocol.initial_status(),
            service: get_service_description(port.as_u16()).to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Record the final status and stamp the completion time.
    pub fn complete(mut self, status: PortStatus) -> Self {
        self.status = status;
        self.timestamp = Utc::now();
        self
    }

    /// Set the resolved hostname.
    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// Trait for probe implementations.
///
/// A prober performs exactly one connectivity check and always returns a
/// classified result; failures become [`PortStatus::Error`] rather than errors.
#[async_trait]
pub trait Prober: Send + Sync {
    /// The transport this prober uses.
    fn protocol(&self) -> Protocol;

    /// Probe a single port on a target within the given timeout.
    async fn probe(&self, target: &str, port: Port, timeout: Duration) -> ScanResult;
}
