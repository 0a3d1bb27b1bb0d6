//! Scanner module - coordinates TCP and UDP probing across many targets.
//!
//! The [`Scanner`] expands the target and port specifications, walks the
//! lazy cross product of targets, ports and protocols, and runs probes with
//! bounded concurrency on the tokio runtime. Open results are enriched with
//! a reverse-resolved hostname, and progress snapshots are published as
//! probes finish.

pub mod progress;
pub mod resolver;
pub mod tcp;
pub mod traits;
pub mod udp;

use crate::error::ScanError;
use crate::types::{expand_targets, parse_ports, Port};
use futures::future;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use progress::{ProgressSink, ScanProgress};
pub use resolver::{DnsLookup, HostLookup, HostnameResolver};
pub use tcp::TcpProber;
pub use traits::{PortStatus, Prober, Protocol, ScanProtocol, ScanResult, WorkItem};
pub use udp::UdpProber;

/// Upper bound on pre-allocated result capacity.
const MAX_PREALLOCATED_RESULTS: u64 = 65536;

/// Configuration for one scan run.
///
/// Built by the caller and left untouched for the duration of the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfiguration {
    /// Target specification: hosts, CIDR blocks and last-octet ranges, comma separated.
    pub targets: String,
    /// Port specification: single ports and `start-end` ranges, comma separated.
    pub ports: String,
    /// Which protocols to probe.
    pub protocol: ScanProtocol,
    /// Maximum number of probes in flight at once.
    pub max_concurrency: usize,
    /// Per-probe timeout in milliseconds for TCP. UDP waits twice as long.
    pub timeout_ms: u64,
}

impl ScanConfiguration {
    /// Ports probed when none are specified.
    pub const DEFAULT_PORTS: &'static str = "21,22,23,25,80,443,445,3389,8080";
    /// Default concurrency level.
    pub const DEFAULT_CONCURRENCY: usize = 100;
    /// Default per-probe timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

    /// Create a configuration for the given targets with default settings.
    pub fn new(targets: impl Into<String>) -> Self {
        Self {
            targets: targets.into(),
            ports: Self::DEFAULT_PORTS.to_string(),
            protocol: ScanProtocol::default(),
            max_concurrency: Self::DEFAULT_CONCURRENCY,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set the port specification.
    pub fn with_ports(mut self, ports: impl Into<String>) -> Self {
        self.ports = ports.into();
        self
    }

    /// Set the protocol selection.
    pub fn with_protocol(mut self, protocol: ScanProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-probe timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Reject configurations that cannot be scanned.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.max_concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ScanError::InvalidConfig(
                "timeout must be greater than 0 ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Timeout applied to a single probe of the given protocol.
    pub fn timeout_for(&self, protocol: Protocol) -> Duration {
        let base = Duration::from_millis(self.timeout_ms);
        match protocol {
            Protocol::Tcp => base,
            Protocol::Udp => base.saturating_mul(2),
        }
    }
}

/// Lazily produce every (target, port, protocol) combination.
///
/// Ordering is target-major, then port, then protocol.
pub fn work_items<'a>(
    targets: &'a [String],
    ports: &'a [Port],
    protocols: &'a [Protocol],
) -> impl Iterator<Item = WorkItem> + 'a {
    targets.iter().flat_map(move |target| {
        ports.iter().flat_map(move |&port| {
            protocols
                .iter()
                .map(move |&protocol| WorkItem::new(target.clone(), port, protocol))
        })
    })
}

/// Scan orchestrator.
///
/// Holds the probers and the hostname lookup backend. The hostname cache is
/// created fresh for every call to [`Scanner::scan`], so answers never leak
/// between unrelated scans.
pub struct Scanner {
    tcp: Arc<dyn Prober>,
    udp: Arc<dyn Prober>,
    lookup: Arc<dyn HostLookup>,
}

impl Scanner {
    /// Create a scanner with socket probers and the system DNS resolver.
    pub fn new() -> Self {
        Self::with_components(
            Arc::new(TcpProber::new()),
            Arc::new(UdpProber::new()),
            Arc::new(DnsLookup::system()),
        )
    }

    /// Create a scanner from explicit components.
    pub fn with_components(
        tcp: Arc<dyn Prober>,
        udp: Arc<dyn Prober>,
        lookup: Arc<dyn HostLookup>,
    ) -> Self {
        Self { tcp, udp, lookup }
    }

    fn prober(&self, protocol: Protocol) -> &dyn Prober {
        match protocol {
            Protocol::Tcp => self.tcp.as_ref(),
            Protocol::Udp => self.udp.as_ref(),
        }
    }

    /// Execute a complete scan.
    ///
    /// Returns every result gathered, in completion order. Cancelling the
    /// token stops new probes from starting; probes already in flight finish
    /// on their own timeout and their results are still returned. Only an
    /// invalid configuration produces an error.
    pub async fn scan(
        &self,
        config: &ScanConfiguration,
        on_progress: Option<ProgressSink>,
        cancel: Option<CancellationToken>,
    ) -> Result<Vec<ScanResult>, ScanError> {
        config.validate()?;
        let targets = expand_targets(&config.targets);
        let ports = parse_ports(&config.ports);
        self.scan_expanded(config, &targets, &ports, on_progress, cancel)
            .await
    }

    /// Execute a scan over targets and ports that were already expanded.
    ///
    /// The `targets` and `ports` strings of `config` are ignored; every other
    /// setting applies exactly as in [`Scanner::scan`].
    pub async fn scan_expanded(
        &self,
        config: &ScanConfiguration,
        targets: &[String],
        ports: &[Port],
        on_progress: Option<ProgressSink>,
        cancel: Option<CancellationToken>,
    ) -> Result<Vec<ScanResult>, ScanError> {
        config.validate()?;

        let start_time = Instant::now();
        let cancel = cancel.unwrap_or_default();
        let protocols = config.protocol.protocols();
        let total = targets.len() as u64 * ports.len() as u64 * protocols.len() as u64;

        info!(
            targets = targets.len(),
            ports = ports.len(),
            protocol = %config.protocol,
            total,
            concurrency = config.max_concurrency,
            timeout_ms = config.timeout_ms,
            "starting scan"
        );

        if total == 0 {
            warn!("nothing to scan: no valid targets or ports");
            return Ok(Vec::new());
        }

        let resolver = HostnameResolver::new(Arc::clone(&self.lookup));
        let mut progress = ScanProgress::new(total);
        let mut results = Vec::with_capacity(total.min(MAX_PREALLOCATED_RESULTS) as usize);

        let mut completed = stream::iter(work_items(targets, ports, protocols))
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|item| self.run_item(item, config, &resolver))
            .buffer_unordered(config.max_concurrency);

        while let Some(result) = completed.next().await {
            progress.record(result.status);
            results.push(result);

            if progress.should_emit() {
                if let Some(sink) = &on_progress {
                    sink(progress);
                }
            }
        }

        let elapsed = start_time.elapsed();
        if cancel.is_cancelled() && !progress.is_complete() {
            info!(
                completed = progress.completed,
                total,
                open = progress.open,
                elapsed_ms = elapsed.as_millis() as u64,
                "scan cancelled"
            );
        } else {
            info!(
                completed = progress.completed,
                open = progress.open,
                closed = progress.closed,
                filtered = progress.filtered,
                errors = progress.errors(),
                resolved_hosts = resolver.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "scan complete"
            );
        }

        Ok(results)
    }

    /// Probe one work item and attach a hostname when it is open.
    async fn run_item(
        &self,
        item: WorkItem,
        config: &ScanConfiguration,
        resolver: &HostnameResolver,
    ) -> ScanResult {
        let timeout = config.timeout_for(item.protocol);
        let prober = self.prober(item.protocol);
        let result = prober.probe(&item.target, item.port, timeout).await;

        if result.is_open() {
            let hostname = resolver.resolve(&item.target).await;
            debug!(
                target_host = %item.target,
                port = %item.port,
                protocol = %prober.protocol(),
                ?hostname,
                "open port found"
            );
            result.with_hostname(hostname)
        } else {
            result
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::resolver::tests::CountingLookup;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Prober with a fixed delay whose answer depends on the port number.
    struct MockProber {
        protocol: Protocol,
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MockProber {
        fn new(protocol: Protocol, delay_ms: u64) -> Self {
            Self {
                protocol,
                delay: Duration::from_millis(delay_ms),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        fn status_for(&self, port: Port) -> PortStatus {
            match port.as_u16() % 5 {
                0 => PortStatus::Open,
                1 => PortStatus::Closed,
                2 => PortStatus::Filtered,
                3 => PortStatus::Error,
                _ => self.protocol.initial_status(),
            }
        }
    }

    #[async_trait]
    impl Prober for MockProber {
        fn protocol(&self) -> Protocol {
            self.protocol
        }

        async fn probe(&self, target: &str, port: Port, _timeout: Duration) -> ScanResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ScanResult::new(target, port, self.protocol).complete(self.status_for(port))
        }
    }

    fn mock_scanner(delay_ms: u64) -> (Scanner, Arc<MockProber>, Arc<MockProber>, Arc<CountingLookup>) {
        let tcp = Arc::new(MockProber::new(Protocol::Tcp, delay_ms));
        let udp = Arc::new(MockProber::new(Protocol::Udp, delay_ms));
        let lookup = Arc::new(CountingLookup::new(&[("10.0.0.1", "one.lan")]));
        let scanner = Scanner::with_components(tcp.clone(), udp.clone(), lookup.clone());
        (scanner, tcp, udp, lookup)
    }

    fn collecting_sink() -> (ProgressSink, Arc<Mutex<Vec<ScanProgress>>>) {
        let seen: Arc<Mutex<Vec<ScanProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: ProgressSink =
            Arc::new(move |p: ScanProgress| sink_seen.lock().unwrap().push(p));
        (sink, seen)
    }

    #[test]
    fn test_validate() {
        assert!(ScanConfiguration::new("h").validate().is_ok());
        assert!(matches!(
            ScanConfiguration::new("h").with_concurrency(0).validate(),
            Err(ScanError::InvalidConfig(_))
        ));
        assert!(matches!(
            ScanConfiguration::new("h").with_timeout_ms(0).validate(),
            Err(ScanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_udp_timeout_doubled() {
        let config = ScanConfiguration::new("h").with_timeout_ms(750);
        assert_eq!(config.timeout_for(Protocol::Tcp), Duration::from_millis(750));
        assert_eq!(config.timeout_for(Protocol::Udp), Duration::from_millis(1500));
    }

    #[test]
    fn test_work_items_cross_product() {
        let targets = vec!["a".to_string(), "b".to_string()];
        let ports = vec![Port::new(22).unwrap(), Port::new(80).unwrap()];
        let items: Vec<_> = work_items(&targets, &ports, ScanProtocol::Both.protocols()).collect();

        assert_eq!(items.len(), 8);
        assert_eq!(items[0], WorkItem::new("a", ports[0], Protocol::Tcp));
        assert_eq!(items[1], WorkItem::new("a", ports[0], Protocol::Udp));
        assert_eq!(items[7], WorkItem::new("b", ports[1], Protocol::Udp));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let (scanner, tcp, _, _) = mock_scanner(0);
        let config = ScanConfiguration::new("10.0.0.1").with_concurrency(0);

        assert!(scanner.scan(&config, None, None).await.is_err());
        assert_eq!(tcp.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_work_set() {
        let (scanner, _, _, _) = mock_scanner(0);
        let (sink, seen) = collecting_sink();
        let config = ScanConfiguration::new("10.0.0.1").with_ports("abc");

        let results = scanner.scan(&config, Some(sink), None).await.unwrap();
        assert!(results.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_final_snapshot_and_counters() {
        let (scanner, _, _, _) = mock_scanner(1);
        let (sink, seen) = collecting_sink();
        let config = ScanConfiguration::new("10.0.0.1,10.0.0.2")
            .with_ports("1-25")
            .with_protocol(ScanProtocol::Both)
            .with_concurrency(8);

        let results = scanner.scan(&config, Some(sink), None).await.unwrap();
        assert_eq!(results.len(), 100);

        let snapshots = seen.lock().unwrap();
        let completions: Vec<u64> = snapshots.iter().map(|p| p.completed).collect();
        assert_eq!(completions, (1..=10).map(|n| n * 10).collect::<Vec<_>>());

        for snapshot in snapshots.iter() {
            assert_eq!(snapshot.total, 100);
            assert!(snapshot.open + snapshot.closed + snapshot.filtered <= snapshot.completed);
        }

        let last = snapshots.last().unwrap();
        assert_eq!(last.completed, 100);
        assert_eq!(last.percentage(), 100.0);
        // Ports 1-25: five of each residue, per target and protocol.
        // TCP residue 4 is closed, UDP residue 4 is open|filtered.
        assert_eq!(last.open, 5 * 4 + 5 * 2);
        assert_eq!(last.closed, 5 * 4 + 5 * 2);
        assert_eq!(last.filtered, 5 * 4);
        assert_eq!(last.errors(), 5 * 4);
    }

    #[tokio::test]
    async fn test_final_snapshot_when_not_multiple_of_ten() {
        let (scanner, _, _, _) = mock_scanner(0);
        let (sink, seen) = collecting_sink();
        let config = ScanConfiguration::new("10.0.0.1").with_ports("1-23");

        scanner.scan(&config, Some(sink), None).await.unwrap();

        let completions: Vec<u64> = seen.lock().unwrap().iter().map(|p| p.completed).collect();
        assert_eq!(completions, vec![10, 20, 23]);
    }

    #[tokio::test]
    async fn test_concurrency_bound() {
        let (scanner, tcp, _, _) = mock_scanner(20);
        let config = ScanConfiguration::new("10.0.0.1")
            .with_ports("1-60")
            .with_concurrency(4);

        let results = scanner.scan(&config, None, None).await.unwrap();
        assert_eq!(results.len(), 60);
        assert!(tcp.peak.load(Ordering::SeqCst) <= 4);
        assert!(tcp.peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_hostnames_only_for_open_results() {
        let (scanner, _, _, lookup) = mock_scanner(0);
        let config = ScanConfiguration::new("10.0.0.1,10.0.0.2")
            .with_ports("1-20")
            .with_protocol(ScanProtocol::Both);

        let results = scanner.scan(&config, None, None).await.unwrap();

        for result in &results {
            match (result.is_open(), result.target.as_str()) {
                (true, "10.0.0.1") => assert_eq!(result.hostname.as_deref(), Some("one.lan")),
                _ => assert_eq!(result.hostname, None),
            }
        }
        // One lookup per distinct target with an open result.
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_not_shared_between_scans() {
        let (scanner, _, _, lookup) = mock_scanner(0);
        let config = ScanConfiguration::new("10.0.0.1").with_ports("5");

        scanner.scan(&config, None, None).await.unwrap();
        scanner.scan(&config, None, None).await.unwrap();
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_results() {
        let (scanner, tcp, _, _) = mock_scanner(5);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let sink: ProgressSink = Arc::new(move |p: ScanProgress| {
            if p.completed >= 20 {
                trigger.cancel();
            }
        });
        let config = ScanConfiguration::new("10.0.0.1")
            .with_ports("1-1000")
            .with_concurrency(4);

        let results = scanner.scan(&config, Some(sink), Some(cancel)).await.unwrap();

        assert!(results.len() >= 20);
        assert!(results.len() < 1000);
        assert_eq!(results.len(), tcp.calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_scan_expanded_uses_given_lists() {
        let (scanner, tcp, _, _) = mock_scanner(0);
        let config = ScanConfiguration::new("ignored.example").with_ports("1-1000");
        let targets = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
        let ports = vec![Port::new(5).unwrap(), Port::new(6).unwrap()];

        let results = scanner
            .scan_expanded(&config, &targets, &ports, None, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(tcp.calls.load(Ordering::SeqCst), 4);
        assert!(results.iter().all(|r| targets.contains(&r.target)));
    }

    #[tokio::test]
    async fn test_scan_expanded_validates_config() {
        let (scanner, tcp, _, _) = mock_scanner(0);
        let config = ScanConfiguration::new("h").with_timeout_ms(0);
        let targets = vec!["10.0.0.1".to_string()];
        let ports = vec![Port::new(5).unwrap()];

        let result = scanner
            .scan_expanded(&config, &targets, &ports, None, None)
            .await;
        assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
        assert_eq!(tcp.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pre_cancelled_scan_starts_nothing() {
        let (scanner, tcp, _, _) = mock_scanner(0);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let config = ScanConfiguration::new("10.0.0.1").with_ports("1-100");

        let results = scanner.scan(&config, None, Some(cancel)).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(tcp.calls.load(Ordering::SeqCst), 0);
    }
}
