//! Application settings and paths.
//!
//! Settings live in the XDG configuration directory
//! (`~/.config/porty/settings.json` on Linux). A missing file means defaults.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{ScanConfiguration, ScanProtocol};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/porty)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform configuration directory.
    pub fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "porty", "porty").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Output format stored in settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Plain,
    /// JSON array of results
    Json,
    /// CSV for spreadsheets and further processing
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default port specification.
    pub default_ports: String,
    /// Default protocol selection.
    pub default_protocol: ScanProtocol,
    /// Default concurrency level.
    pub default_concurrency: usize,
    /// Default timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Default output format.
    pub default_output_format: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_ports: ScanConfiguration::DEFAULT_PORTS.to_string(),
            default_protocol: ScanProtocol::Tcp,
            default_concurrency: ScanConfiguration::DEFAULT_CONCURRENCY,
            default_timeout_ms: ScanConfiguration::DEFAULT_TIMEOUT_MS,
            default_output_format: OutputFormat::Plain,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();

        if !file.exists() {
            debug!(path = %file.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build a scan configuration for the given targets from these defaults.
    pub fn scan_configuration(&self, targets: impl Into<String>) -> ScanConfiguration {
        ScanConfiguration::new(targets)
            .with_ports(self.default_ports.clone())
            .with_protocol(self.default_protocol)
            .with_concurrency(self.default_concurrency)
            .with_timeout_ms(self.default_timeout_ms)
    }
}
