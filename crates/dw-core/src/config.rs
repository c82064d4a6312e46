//! Configuration types for docsis-watch.
//!
//! [`Config::load`] reads `~/.config/docsis-watch/config.toml`, creating it
//! with hardcoded defaults if it does not yet exist, and layers
//! `DOCSIS_WATCH_*` environment variables on top. [`Config::defaults`]
//! returns the built-in defaults without touching the filesystem (useful in
//! tests).

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::ColumnLayout;
use crate::rules::Rules;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[modem]
host               = "192.168.100.1"
transport          = "http"
scan_interval_secs = 90

[http]
path         = "/getRouterStatus"
timeout_secs = 10

[snmp]
community      = "public"
port           = 161
timeout_ms     = 1000
retries        = 1
rows           = 20
fetch_priority = false

[columns]
time     = "1.3.6.1.2.1.69.1.5.8.1.2"
message  = "1.3.6.1.2.1.69.1.5.8.1.7"
priority = "1.3.6.1.2.1.69.1.5.8.1.5"

[rules]
default_priority = "notice"
trouble_keywords = [
    "partial service",
    "loss of sync",
    "no ranging response",
    "retries exhausted",
    "t3 time-out",
    "t4 time-out",
    "sync timing",
]
priority = [
    { pattern = "t4 time-out",         priority = "critical" },
    { pattern = "loss of sync",        priority = "critical" },
    { pattern = "sync timing",         priority = "critical" },
    { pattern = "no ranging response", priority = "critical" },
    { pattern = "retries exhausted",   priority = "critical" },
    { pattern = "t3 time-out",         priority = "warning" },
    { pattern = "partial service",     priority = "warning" },
]
"#;

const ENV_PREFIX: &str = "DOCSIS_WATCH";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid_host: modem host must not be empty")]
    InvalidHost,
    #[error("unknown transport {0:?} (expected \"http\" or \"snmp\")")]
    UnknownTransport(String),
    #[error("scan interval must be at least one second")]
    InvalidInterval,
    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("failed to create default configuration: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/docsis-watch/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub modem: ModemConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub snmp: SnmpConfig,
    #[serde(default)]
    pub columns: ColumnLayout,
    #[serde(default)]
    pub rules: Rules,
}

/// How snapshots are fetched from the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Http,
    Snmp,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Transport::Http),
            "snmp" => Ok(Transport::Snmp),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Http => write!(f, "http"),
            Transport::Snmp => write!(f, "snmp"),
        }
    }
}

/// `[modem]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ModemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_host() -> String { "192.168.100.1".to_string() }
fn default_scan_interval_secs() -> u64 { 90 }

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            transport: Transport::default(),
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_path() -> String { "/getRouterStatus".to_string() }
fn default_timeout_secs() -> u64 { 10 }

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[snmp]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SnmpConfig {
    #[serde(default = "default_community")]
    pub community: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default)]
    pub fetch_priority: bool,
}

fn default_community() -> String { "public".to_string() }
fn default_port() -> u16 { 161 }
fn default_timeout_ms() -> u64 { 1000 }
fn default_retries() -> u32 { 1 }
fn default_rows() -> u32 { 20 }

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            rows: default_rows(),
            fetch_priority: false,
        }
    }
}

impl SnmpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/docsis-watch/config.toml`. See [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load `path` layered on top of the built-in defaults, then environment
    /// overrides. Creates the file with defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, DEFAULT_CONFIG.trim_start())?;
        }

        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document layered on top of the built-in defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modem.host.trim().is_empty() {
            return Err(ConfigError::InvalidHost);
        }
        if self.modem.scan_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.modem.scan_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("docsis-watch")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
