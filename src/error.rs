//! Error types for Porty.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-probe and per-token
//! failures are never errors: they surface as [`PortStatus::Error`], ignored
//! tokens, or a missing hostname. Only configuration problems end up here.
//!
//! [`PortStatus::Error`]: crate::scanner::PortStatus::Error

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from a single hostname lookup.
///
/// These never leave the resolver: a failed lookup is cached as "no name".
#[derive(Error, Debug, Clone)]
pub enum LookupError {
    #[error("DNS resolution failed for '{0}': {1}")]
    DnsResolution(String, String),

    #[error("no records found for '{0}'")]
    NoRecords(String),
}

/// Errors raised while loading or saving application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory for this platform")]
    DirectoryNotFound,

    #[error("failed to read {}: {reason}", .path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {}: {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
