//! TOML configuration parsing.
//!
//! Every section is optional; omitted keys take the defaults below, which
//! match the voice-first deployment (ten results per page, voice on).
//!
//! ```toml
//! [data]
//! dir = "./data"
//!
//! [limits]
//! max_results = 10
//! default_page_size = 10
//!
//! [voice]
//! default_mode = true
//!
//! [server]
//! bind = "127.0.0.1:8000"
//! debug = false
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory holding `customers.json`, `support_tickets.json` and `analytics.json`.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Hard ceiling on page size, whatever the caller asks for.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_max_results() -> usize {
    10
}
fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct VoiceConfig {
    /// Voice mode applied when a request does not say.
    #[serde(default = "default_voice_mode")]
    pub default_mode: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_mode: default_voice_mode(),
        }
    }
}

fn default_voice_mode() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Expose internal error details in 500 responses.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            debug: false,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_results == 0 {
            anyhow::bail!("limits.max_results must be >= 1");
        }
        if self.limits.default_page_size == 0 {
            anyhow::bail!("limits.default_page_size must be >= 1");
        }
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    Config::from_toml(&content)
}

/// Loads `path` if it exists, otherwise falls back to defaults when
/// `allow_missing` is set (the CLI's implicit default path).
pub fn load_or_default(path: &Path, allow_missing: bool) -> Result<Config> {
    if allow_missing && !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}
