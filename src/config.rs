//! Configuration management for StudyQA
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, StudyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for StudyQA
///
/// Holds the relay server, upstream provider, relay client, storage,
/// rendering and logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Relay server settings
    #[serde(default)]
    pub relay: RelayConfig,
    /// Upstream chat-completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Relay client settings used by the CLI
    #[serde(default)]
    pub client: ClientConfig,
    /// Persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Typed-markdown rendering settings
    #[serde(default)]
    pub render: RenderConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Interface to bind
    #[serde(default = "default_relay_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_relay_port")]
    pub port: u16,

    /// Forward client-supplied conversation history on `/ask`
    ///
    /// When false (the default) only the system prompt and the question
    /// are sent upstream.
    #[serde(default)]
    pub forward_history: bool,

    /// Allowed CORS origins; `None` allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Option<Vec<String>>,
}

fn default_relay_host() -> String {
    "127.0.0.1".to_string()
}

fn default_relay_port() -> u16 {
    3000
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_relay_host(),
            port: default_relay_port(),
            forward_history: false,
            cors_allowed_origins: None,
        }
    }
}

/// Upstream chat-completion provider configuration
///
/// Any OpenAI-compatible `/chat/completions` endpoint works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API base URL
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_provider_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_provider_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_provider_model() -> String {
    "deepseek-chat".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            model: default_provider_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Relay client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the relay server
    #[serde(default = "default_client_base_url")]
    pub base_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_client_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_client_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path; defaults to the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Typed-markdown rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Reveal responses incrementally instead of all at once
    #[serde(default = "default_animate")]
    pub animate: bool,

    /// Characters revealed between frames
    #[serde(default = "default_render_step")]
    pub step: usize,

    /// Pause between frames (milliseconds)
    #[serde(default = "default_render_delay_ms")]
    pub delay_ms: u64,
}

fn default_animate() -> bool {
    true
}

fn default_render_step() -> usize {
    3
}

fn default_render_delay_ms() -> u64 {
    6
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            animate: default_animate(),
            step: default_render_step(),
            delay_ms: default_render_delay_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted logs
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StudyError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| StudyError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("STUDYQA_RELAY_HOST") {
            self.relay.host = host;
        }

        if let Ok(port) = std::env::var("STUDYQA_RELAY_PORT") {
            match port.parse() {
                Ok(value) => self.relay.port = value,
                Err(_) => tracing::warn!("Invalid STUDYQA_RELAY_PORT: {}", port),
            }
        }

        if let Ok(forward) = std::env::var("STUDYQA_FORWARD_HISTORY") {
            match forward.parse::<bool>() {
                Ok(value) => self.relay.forward_history = value,
                Err(_) => tracing::warn!("Invalid STUDYQA_FORWARD_HISTORY: {}", forward),
            }
        }

        if let Ok(base_url) = std::env::var("STUDYQA_PROVIDER_BASE_URL") {
            self.provider.base_url = base_url;
        }

        if let Ok(model) = std::env::var("STUDYQA_MODEL") {
            self.provider.model = model;
        }

        if let Ok(relay_url) = std::env::var("STUDYQA_RELAY_URL") {
            self.client.base_url = relay_url;
        }

        if let Ok(path) = std::env::var("STUDYQA_STORAGE") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(animate) = std::env::var("STUDYQA_ANIMATE") {
            match animate.parse::<bool>() {
                Ok(value) => self.render.animate = value,
                Err(_) => tracing::warn!("Invalid STUDYQA_ANIMATE: {}", animate),
            }
        }

        if let Ok(level) = std::env::var("STUDYQA_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
        if cli.json_logs {
            self.logging.json_format = true;
        }
        if let Some(path) = &cli.storage_path {
            tracing::debug!(path = %path, "Storage path overridden from CLI");
            self.storage.path = Some(PathBuf::from(path));
        }
        if let Some(url) = &cli.relay_url {
            tracing::debug!(url = %url, "Relay URL overridden from CLI");
            self.client.base_url = url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.relay.port == 0 {
            return Err(StudyError::Config("relay.port must be greater than 0".to_string()).into());
        }

        if self.provider.model.trim().is_empty() {
            return Err(StudyError::Config("provider.model cannot be empty".to_string()).into());
        }

        if self.provider.api_key_env.trim().is_empty() {
            return Err(
                StudyError::Config("provider.api_key_env cannot be empty".to_string()).into(),
            );
        }

        url::Url::parse(&self.provider.base_url).map_err(|e| {
            StudyError::Config(format!(
                "Invalid provider.base_url '{}': {}",
                self.provider.base_url, e
            ))
        })?;

        url::Url::parse(&self.client.base_url).map_err(|e| {
            StudyError::Config(format!(
                "Invalid client.base_url '{}': {}",
                self.client.base_url, e
            ))
        })?;

        if self.provider.timeout_seconds == 0 || self.client.timeout_seconds == 0 {
            return Err(StudyError::Config("timeouts must be greater than 0".to_string()).into());
        }

        if self.render.step == 0 {
            return Err(StudyError::Config("render.step must be greater than 0".to_string()).into());
        }

        if self.render.delay_ms > 1000 {
            return Err(StudyError::Config(
                "render.delay_ms must be at most 1000".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Address the relay server binds to
    pub fn relay_addr(&self) -> String {
        format!("{}:{}", self.relay.host, self.relay.port)
    }
}
