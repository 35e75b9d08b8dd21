//! Configuration loading and management.
//!
//! The engine reads a flat TOML file. Every key has a default, so an empty
//! file (or [`Config::default`]) yields a working configuration that writes
//! under `./meetings` in UTC.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Format of the formatted log and minutes artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// HTML output (the only supported format).
    Html,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory meeting artifacts are written under.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// URL prefix the hosting web server maps onto `log_dir`.
    /// Artifact URLs are `{url_prefix}/{relative path}`.
    #[serde(default)]
    pub url_prefix: String,

    /// File-prefix pattern for artifacts, relative to `log_dir`.
    ///
    /// `{channel}`, `{network}`, `{name}` and `{id}` interpolate meeting
    /// fields; strftime codes render the meeting start time in `timezone`.
    /// Slashes create subdirectories.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Timezone used when rendering timestamps (an IANA name such as
    /// "America/Chicago"). Unknown names fall back to UTC.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Format of the formatted log and minutes.
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            url_prefix: String::new(),
            pattern: default_pattern(),
            timezone: default_timezone(),
            output_format: default_output_format(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("meetings")
}

fn default_pattern() -> String {
    "%Y/{channel}.%Y%m%d.%H%M".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Html
}
