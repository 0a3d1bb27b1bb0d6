//! Configuration management for Porty.
//!
//! Provides XDG-compliant storage of default scan settings.

mod settings;

pub use settings::{AppSettings, OutputFormat, Paths};
