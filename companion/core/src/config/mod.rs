//! TOML Configuration File Support
//!
//! Centralized configuration loading for the companion, supporting a TOML
//! file at `~/.config/companion/companion.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! endpoint = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
//! api_key = "your-key-here"
//!
//! [session]
//! greeting = "Hi! How are you feeling today?"
//! update_buffer = 100
//!
//! [logging]
//! file = "/tmp/companion.log"
//! filter = "info"
//! ```
//!
//! # Environment Variables
//!
//! - `COMPANION_ENDPOINT`
//! - `COMPANION_API_KEY`
//! - `COMPANION_GREETING` (empty disables the greeting)
//! - `COMPANION_LOG_FILE`

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::DEFAULT_ENDPOINT;

/// Greeting posted when a session starts
pub const DEFAULT_GREETING: &str =
    "Hi there! I'm your mental health companion powered by Gemini. How are you feeling today?";

/// Default capacity of the session update channel
pub const DEFAULT_UPDATE_BUFFER: usize = 100;

/// Smallest accepted update channel capacity
///
/// A surface drains the channel after every session call, and a single call
/// (a submit or a settled reply) sends at most three updates.
pub const MIN_UPDATE_BUFFER: usize = 8;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// `generateContent` endpoint URL
    pub endpoint: Option<String>,

    /// API key sent as the `key` query parameter
    pub api_key: Option<String>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Opening message; empty string disables it
    pub greeting: Option<String>,

    /// Capacity of the session update channel
    pub update_buffer: Option<usize>,
}

/// Logging section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingToml {
    /// Log file path
    pub file: Option<String>,

    /// `tracing` filter directive (e.g. `info`, `companion_core=debug`)
    pub filter: Option<String>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionToml {
    /// Backend settings
    pub backend: BackendToml,

    /// Session settings
    pub session: SessionToml,

    /// Logging settings
    pub logging: LoggingToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration
#[derive(Clone, Debug)]
pub struct CompanionConfig {
    /// `generateContent` endpoint URL
    pub endpoint: String,

    /// API key (may be empty; the service will then reject requests)
    pub api_key: String,

    /// Opening message, `None` to skip it
    pub greeting: Option<String>,

    /// Capacity of the session update channel
    pub update_buffer: usize,

    /// Log file path, `None` for the platform default
    pub log_file: Option<PathBuf>,

    /// `tracing` filter directive
    pub log_filter: String,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            update_buffer: DEFAULT_UPDATE_BUFFER,
            log_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl CompanionConfig {
    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Whether an API key is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Check values that would make the companion unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty or non-HTTP endpoint
    /// or an update buffer smaller than [`MIN_UPDATE_BUFFER`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Validation("endpoint is required".to_string()));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "endpoint must be an http(s) URL, got {endpoint}"
            )));
        }
        if self.update_buffer < MIN_UPDATE_BUFFER {
            return Err(ConfigError::Validation(format!(
                "update_buffer must be at least {MIN_UPDATE_BUFFER}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/companion/companion.toml` or
/// `~/.config/companion/companion.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("companion").join("companion.toml"))
}

/// Get the default log file path
///
/// Prefers the XDG state directory, falling back to the cache directory.
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|p| p.join("companion").join("companion.log"))
}

/// Load configuration from all sources with proper priority
///
/// CLI arguments are not handled here; apply [`ConfigOverrides`] afterwards.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resulting values fail validation. A missing config file is not an
/// error (defaults are used).
pub fn load_config() -> Result<CompanionConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// If `path` is `None`, only defaults and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the resulting values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<CompanionConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment variables through `env`
fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<CompanionConfig, ConfigError> {
    // Start with defaults
    let mut config = CompanionConfig::default();

    // Try to load from file
    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: CompanionToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Apply environment variables (overrides file values)
    apply_env_config(&mut config, env);

    config.validate()?;
    Ok(config)
}

/// Turn a configured greeting into the session's greeting
fn greeting_setting(greeting: &str) -> Option<String> {
    if greeting.trim().is_empty() {
        None
    } else {
        Some(greeting.to_string())
    }
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut CompanionConfig, toml: &CompanionToml) {
    if let Some(ref endpoint) = toml.backend.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(ref key) = toml.backend.api_key {
        config.api_key.clone_from(key);
    }

    if let Some(ref greeting) = toml.session.greeting {
        config.greeting = greeting_setting(greeting);
    }
    if let Some(buffer) = toml.session.update_buffer {
        config.update_buffer = buffer;
    }

    if let Some(ref file) = toml.logging.file {
        config.log_file = Some(PathBuf::from(file));
    }
    if let Some(ref filter) = toml.logging.filter {
        config.log_filter.clone_from(filter);
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut CompanionConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = env("COMPANION_ENDPOINT") {
        config.endpoint = endpoint;
        config.source = ConfigSource::Env;
    }
    if let Some(key) = env("COMPANION_API_KEY") {
        config.api_key = key;
        config.source = ConfigSource::Env;
    }
    if let Some(greeting) = env("COMPANION_GREETING") {
        config.greeting = greeting_setting(&greeting);
        config.source = ConfigSource::Env;
    }
    if let Some(file) = env("COMPANION_LOG_FILE") {
        config.log_file = Some(PathBuf::from(file));
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Endpoint override
    pub endpoint: Option<String>,

    /// API key override
    pub api_key: Option<String>,

    /// Suppress the greeting
    pub no_greeting: bool,

    /// Log file override
    pub log_file: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set API key override
    #[must_use]
    pub fn with_api_key(mut self, key: String) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Suppress the greeting
    #[must_use]
    pub fn without_greeting(mut self) -> Self {
        self.no_greeting = true;
        self
    }

    /// Set log file override
    #[must_use]
    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut CompanionConfig) {
        if self.endpoint.is_some()
            || self.api_key.is_some()
            || self.no_greeting
            || self.log_file.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref endpoint) = self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(ref key) = self.api_key {
            config.api_key.clone_from(key);
        }
        if self.no_greeting {
            config.greeting = None;
        }
        if let Some(ref path) = self.log_file {
            config.log_file = Some(path.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
