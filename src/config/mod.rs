//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `DIGITAL_ARCHIVE__`
//! (e.g. `DIGITAL_ARCHIVE__ARCHIVE__ITEMS_PER_PAGE=50`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [archive]
//! base_url = "https://digitalarchive.wilsoncenter.org"
//! items_per_page = 200
//! max_concurrent_requests = 8
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! accept_invalid_certs = false
//!
//! [retry]
//! max_attempts = 1
//! initial_delay_ms = 500
//! max_delay_ms = 30000
//! backoff_multiplier = 2.0
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::transport::{ArchiveError, DEFAULT_BASE_URL};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "digital-archive.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Archive location and search behavior
    #[serde(default)]
    pub archive: ArchiveSettings,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Retry policy for the HTTP transport
    #[serde(default)]
    pub retry: RetrySettings,

    /// Logging settings for the CLI
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Archive location and search behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size sent as `itemsPerPage`
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,

    /// Upper bound on concurrent page fetches and hydrations
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            items_per_page: default_items_per_page(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_items_per_page() -> u32 {
    200
}

fn default_max_concurrent() -> usize {
    8
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Defaults to `digital-archive/<version>`
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Skip TLS certificate verification. The archive host has served an
    /// incomplete certificate chain in the past.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Retry policy for the HTTP transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per request, including the first. `1` disables retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff")]
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff(),
        }
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_backoff() -> f64 {
    2.0
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` for structured output, plain text otherwise
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file, without environment overrides
    pub fn load(path: &Path) -> Result<Self, ArchiveError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ArchiveError::Config(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ArchiveError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ArchiveError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ArchiveError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ArchiveError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Load configuration from an optional file plus `DIGITAL_ARCHIVE__*`
/// environment variables
pub fn load_config(path: Option<&Path>) -> Result<Config, ArchiveError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix("DIGITAL_ARCHIVE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Locate a configuration file: `./digital-archive.toml`, then
/// `<config dir>/digital-archive/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("digital-archive").join("config.toml"))
        .filter(|path| path.is_file())
}
