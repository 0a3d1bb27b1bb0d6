//! TCP connect prober.
//!
//! Performs standard TCP connect attempts using the operating system's
//! socket API, racing each attempt against a per-probe timeout. The
//! connection is dropped as soon as it is established; nothing is sent.

use crate::scanner::traits::{PortStatus, Prober, Protocol, ScanResult};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// TCP connect prober.
///
/// Does not require elevated privileges. Targets may be IP literals or
/// hostnames; hostnames are resolved by the connect call itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }

    /// Attempt to connect, mapping the outcome to a port status.
    async fn attempt_connect(target: &str, port: u16, limit: Duration) -> PortStatus {
        match timeout(limit, TcpStream::connect((target, port))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortStatus::Open
            }
            Ok(Err(e)) => {
                let status = classify_connect_error(&e);
                trace!(target_host = target, port, error = %e, %status, "connect failed");
                status
            }
            Err(_) => PortStatus::Filtered,
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn probe(&self, target: &str, port: Port, timeout: Duration) -> ScanResult {
        let result = ScanResult::new(target, port, Protocol::Tcp);
        let status = Self::attempt_connect(target, port.as_u16(), timeout).await;
        debug!(target_host = target, %port, %status, "tcp probe complete");
        result.complete(status)
    }
}

/// Classify a failed connect attempt.
///
/// Refused means closed. Unreachable hosts/networks and socket-level
/// timeouts mean filtered. Anything else (resolution failure, local socket
/// errors) is a probe error.
pub fn classify_connect_error(err: &io::Error) -> PortStatus {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => PortStatus::Closed,
        io::ErrorKind::TimedOut => PortStatus::Filtered,
        _ if is_unreachable(err) => PortStatus::Filtered,
        _ => PortStatus::Error,
    }
}

/// Check whether an error reports an unreachable host or network.
pub(crate) fn is_unreachable(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        if let Some(code) = err.raw_os_error() {
            return matches!(
                code,
                libc::EHOSTUNREACH | libc::ENETUNREACH | libc::EHOSTDOWN | libc::ENETDOWN
            );
        }
    }

    err.to_string().to_lowercase().contains("unreachable")
}
