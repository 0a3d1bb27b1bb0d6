//! Command-line interface definitions for Porty.
//!
//! Uses `clap` derive macros for declarative argument parsing. Every scan
//! option is optional on the command line; anything left unset falls back to
//! the saved [`AppSettings`].

use crate::config::{AppSettings, OutputFormat};
use crate::scanner::{ScanConfiguration, ScanProtocol};
use crate::types::PortPreset;
use clap::Parser;
use std::path::PathBuf;

/// A fast TCP/UDP port scanner for hosts, CIDR blocks and address ranges.
#[derive(Parser, Debug)]
#[command(name = "porty")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast TCP/UDP port scanner", long_about = None)]
pub struct Args {
    /// Targets to scan, comma separated
    ///
    /// Examples:
    ///   192.168.1.1              Single IP address
    ///   example.com              Hostname
    ///   192.168.1.0/24           CIDR block
    ///   192.168.1.10-20          Last-octet range
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan (e.g., "80", "80,443", "1-1000", "22,80,443,8000-9000")
    #[arg(short, long, conflicts_with = "preset")]
    pub ports: Option<String>,

    /// Use a predefined port set instead of an explicit list
    #[arg(long, value_enum)]
    pub preset: Option<PortPreset>,

    /// Protocol to probe
    #[arg(long, value_enum)]
    pub protocol: Option<ScanProtocol>,

    /// Maximum number of probes in flight
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Probe timeout in milliseconds (UDP waits twice as long)
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Show every result, not only open ports
    #[arg(long)]
    pub all: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress and informational output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to a settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Store the effective scan options as the new defaults before scanning
    #[arg(long)]
    pub save_defaults: bool,
}

impl Args {
    /// Port specification after applying a preset or the saved default.
    pub fn port_spec(&self, settings: &AppSettings) -> String {
        match (&self.ports, self.preset) {
            (Some(ports), _) => ports.clone(),
            (None, Some(preset)) => preset.spec().to_string(),
            (None, None) => settings.default_ports.clone(),
        }
    }

    /// Saved settings with every command-line override applied.
    pub fn merged_settings(&self, settings: &AppSettings) -> AppSettings {
        AppSettings {
            default_ports: self.port_spec(settings),
            default_protocol: self.protocol.unwrap_or(settings.default_protocol),
            default_concurrency: self.concurrency.unwrap_or(settings.default_concurrency),
            default_timeout_ms: self.timeout.unwrap_or(settings.default_timeout_ms),
            default_output_format: self.output_format(settings),
        }
    }

    /// Merge command-line overrides on top of the saved settings.
    pub fn scan_configuration(&self, settings: &AppSettings) -> ScanConfiguration {
        self.merged_settings(settings)
            .scan_configuration(self.target.clone())
    }

    /// Output format chosen on the command line or in settings.
    pub fn output_format(&self, settings: &AppSettings) -> OutputFormat {
        self.output.unwrap_or(settings.default_output_format)
    }

    /// Log filter directive implied by the verbosity flags.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "porty=debug"
        } else if self.quiet {
            "porty=warn"
        } else {
            "porty=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("porty").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let settings = AppSettings {
            default_ports: "22".to_string(),
            default_timeout_ms: 300,
            ..AppSettings::default()
        };
        let args = parse(&["10.0.0.1"]);
        let config = args.scan_configuration(&settings);

        assert_eq!(config.targets, "10.0.0.1");
        assert_eq!(config.ports, "22");
        assert_eq!(config.timeout_ms, 300);
        assert_eq!(config.protocol, ScanProtocol::Tcp);
        assert_eq!(args.output_format(&settings), OutputFormat::Plain);
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "10.0.0.0/30",
            "-p",
            "80,443",
            "--protocol",
            "both",
            "-c",
            "10",
            "-t",
            "50",
            "-o",
            "json",
        ]);
        let settings = AppSettings::default();
        let config = args.scan_configuration(&settings);

        assert_eq!(config.ports, "80,443");
        assert_eq!(config.protocol, ScanProtocol::Both);
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.timeout_ms, 50);
        assert_eq!(args.output_format(&settings), OutputFormat::Json);
    }

    #[test]
    fn test_merged_settings_keep_unset_values() {
        let settings = AppSettings {
            default_concurrency: 42,
            ..AppSettings::default()
        };
        let args = parse(&["h", "--preset", "database", "-o", "csv", "--save-defaults"]);
        let merged = args.merged_settings(&settings);

        assert!(args.save_defaults);
        assert_eq!(merged.default_ports, PortPreset::Database.spec());
        assert_eq!(merged.default_output_format, OutputFormat::Csv);
        assert_eq!(merged.default_concurrency, 42);
        assert_eq!(merged.default_timeout_ms, settings.default_timeout_ms);
    }

    #[test]
    fn test_preset() {
        let args = parse(&["h", "--preset", "web"]);
        assert_eq!(args.port_spec(&AppSettings::default()), PortPreset::Web.spec());
    }

    #[test]
    fn test_ports_conflict_with_preset() {
        let result = Args::try_parse_from(["porty", "h", "-p", "80", "--preset", "web"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(parse(&["h", "-v"]).log_directive(), "porty=debug");
        assert_eq!(parse(&["h", "-q"]).log_directive(), "porty=warn");
        assert_eq!(parse(&["h"]).log_directive(), "porty=info");
    }
}
