//! # Porty - A Concurrent TCP/UDP Port Scanner
//!
//! Porty probes many (target, port, protocol) combinations concurrently and
//! classifies each one as open, closed, filtered, open|filtered or error.
//!
//! ## Features
//!
//! - **Flexible Targeting**: Hostnames, IPv4 literals, CIDR blocks and last-octet ranges
//! - **Lenient Port Lists**: Single ports, ranges and presets, deduplicated and sorted
//! - **TCP and UDP**: Connect probes and single-datagram UDP probes
//! - **Bounded Concurrency**: Lazy work items with a configurable in-flight limit
//! - **Hostname Enrichment**: Cached reverse DNS for targets with open ports
//! - **Progress and Cancellation**: Throttled snapshots and cooperative cancellation
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use porty::scanner::{ScanConfiguration, ScanProtocol, Scanner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScanConfiguration::new("192.168.1.0/30")
//!         .with_ports("22,80,443")
//!         .with_protocol(ScanProtocol::Tcp);
//!
//!     let results = Scanner::new().scan(&config, None, None).await.unwrap();
//!     for result in results.iter().filter(|r| r.is_open()) {
//!         println!("{}:{} is {}", result.target, result.port, result.status);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port presets, and target expansion
//! - [`services`] - Well-known port to service label table
//! - [`scanner`] - Probers, hostname resolution, progress and the scan orchestrator
//! - [`config`] - Saved default settings
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities
//! - [`cli`] - Command-line arguments

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, LookupError, ScanError};
pub use scanner::{
    PortStatus, ProgressSink, Protocol, ScanConfiguration, ScanProgress, ScanProtocol,
    ScanResult, Scanner,
};
pub use types::{Port, PortPreset};
