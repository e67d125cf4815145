//! Configuration management.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `DOI_VERIFY_*` environment variables (`__` separates nesting, e.g.
//! `DOI_VERIFY_LLM__MODEL`). The binary applies its CLI flags last.
//!
//! # Configuration File Format
//!
//! ```toml
//! [llm]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//!
//! [registry]
//! base_url = "https://api.crossref.org"
//! mailto = "you@example.org"
//!
//! [http]
//! timeout_secs = 30
//!
//! [retry]
//! max_attempts = 5
//! initial_delay_ms = 1000
//! max_delay_ms = 30000
//! backoff_multiplier = 2.0
//!
//! [logging]
//! level = "info"
//! ```

mod file_config;

pub use file_config::{save_config, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::{DEFAULT_MODEL, OPENAI_API_BASE};
use crate::sources::CROSSREF_API_BASE;
use crate::utils::{RetryConfig, DEFAULT_TIMEOUT};

/// Environment variable holding the language model credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "DOI_VERIFY";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "doi-verify.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Language model settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Bibliographic registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// HTTP settings shared by all clients
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry policy for language model calls
    #[serde(default)]
    pub retry: RetrySettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Request timeout for every HTTP client
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Retry policy for language model calls
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            backoff_multiplier: self.retry.backoff_multiplier,
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; never written back to disk
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            base_url: default_llm_base_url(),
            model: default_model(),
        }
    }
}

fn default_llm_base_url() -> String {
    OPENAI_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the CrossRef API
    #[serde(default = "default_registry_base_url")]
    pub base_url: String,

    /// Contact address for CrossRef's polite pool
    #[serde(default)]
    pub mailto: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_base_url(),
            mailto: None,
        }
    }
}

fn default_registry_base_url() -> String {
    CROSSREF_API_BASE.to_string()
}

/// HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Retry configuration as it appears in files and the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Load configuration from an optional file plus environment overrides.
///
/// When no API key is configured, [`API_KEY_ENV`] is consulted.
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    if config.llm.api_key.is_none() {
        config.llm.api_key = std::env::var(API_KEY_ENV).ok();
    }
    Ok(config)
}

/// Find a configuration file in the default locations.
///
/// Checks `./doi-verify.toml`, then `<config dir>/doi-verify/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("doi-verify").join("config.toml"))
        .filter(|path| path.is_file())
}
