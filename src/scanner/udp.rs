//! UDP prober.
//!
//! Sends a single one-byte datagram and waits for anything to come back.
//! UDP scanning is inherently ambiguous because of its connectionless nature.
//!
//! # Detection Methods
//!
//! 1. **UDP Response**: If any data is received, the port is open
//! 2. **ICMP Port Unreachable**: Surfaces on a connected socket as a refused
//!    or reset error, so the port is closed
//! 3. **No Response**: The port is either open or filtered
//!
//! No privileges are needed; the ICMP signal is delivered through the
//! connected socket by the operating system.

use crate::scanner::traits::{PortStatus, Prober, Protocol, ScanResult};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, trace};

/// Payload sent to every UDP port.
const PROBE_PAYLOAD: &[u8] = &[0x00];

/// UDP prober for detecting responsive UDP ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpProber;

impl UdpProber {
    pub fn new() -> Self {
        Self
    }

    /// Send the probe and wait for a response.
    ///
    /// Socket errors returned here (resolution, bind, connect) are
    /// classified by the caller like any other receive-side error.
    async fn exchange(target: &str, port: u16, limit: Duration) -> io::Result<PortStatus> {
        let Some(addr) = lookup_host((target, port)).await?.next() else {
            debug!(target_host = target, port, "resolution returned no address");
            return Ok(PortStatus::Error);
        };

        // Bind to a random local port of the matching family.
        let local_addr = if addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(local_addr).await?;
        socket.connect(addr).await?;

        if let Err(e) = socket.send(PROBE_PAYLOAD).await {
            trace!(target_host = target, port, error = %e, "send failed");
            return Ok(classify_receive_error(&e));
        }

        let mut buf = [0u8; 1024];
        let status = match timeout(limit, socket.recv(&mut buf)).await {
            Ok(Ok(_)) => PortStatus::Open,
            Ok(Err(e)) => {
                trace!(target_host = target, port, error = %e, "recv failed");
                classify_receive_error(&e)
            }
            Err(_) => PortStatus::OpenFiltered,
        };

        Ok(status)
    }
}

#[async_trait]
impl Prober for UdpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    async fn probe(&self, target: &str, port: Port, timeout: Duration) -> ScanResult {
        let result = ScanResult::new(target, port, Protocol::Udp);

        let status = match Self::exchange(target, port.as_u16(), timeout).await {
            Ok(status) => status,
            Err(e) => {
                debug!(target_host = target, %port, error = %e, "udp socket error");
                classify_receive_error(&e)
            }
        };

        debug!(target_host = target, %port, %status, "udp probe complete");
        result.complete(status)
    }
}

/// Classify a socket error seen while exchanging the probe datagram.
///
/// A refused or reset connection is the ICMP port-unreachable signal, so the
/// port is closed. Everything else, including socket timeouts and local
/// setup failures, stays ambiguous.
pub fn classify_receive_error(err: &io::Error) -> PortStatus {
    match err.kind() {
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => PortStatus::Closed,
        _ => Protocol::Udp.initial_status(),
    }
}
