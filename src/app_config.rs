use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::providers::ProviderKind;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Target language code (ISO 639-1/639-3, optionally with a script or region subtag)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation backend settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Batching and retry settings
    #[serde(default)]
    pub batching: BatchConfig,

    /// Input limits
    #[serde(default)]
    pub input: InputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: Which endpoint handles requests
    #[serde(default)]
    pub provider: ProviderKind,

    // @field: Base URL of the translate service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: User API key, empty means the shared quota
    #[serde(default)]
    pub api_key: String,

    // @field: User prompt template, empty means the service default
    #[serde(default)]
    pub prompt_template: String,

    // @field: Custom upstream host, empty means the service default
    #[serde(default)]
    pub base_host: String,

    // @field: Redirects lead to a purchase flow instead of a rate-limit error
    #[serde(default)]
    pub enable_shop: bool,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            endpoint: default_endpoint(),
            api_key: String::new(),
            prompt_template: String::new(),
            base_host: String::new(),
            enable_shop: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Batching and retry settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Cues per translation request, also the page size
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Attempts per batch before a whole-file run is aborted
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait after a failed attempt, in milliseconds
    #[serde(default = "default_retry_cooldown_ms")]
    pub retry_cooldown_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_attempts: default_max_attempts(),
            retry_cooldown_ms: default_retry_cooldown_ms(),
        }
    }
}

/// Input limits
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InputConfig {
    /// Largest accepted subtitle file, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_page_size() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_cooldown_ms() -> u64 {
    3000
}

fn default_max_file_size() -> u64 {
    512 * 1024
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.target_language)?;

        if self.batching.page_size == 0 {
            return Err(anyhow!("Page size must be greater than zero"));
        }
        if self.batching.max_attempts == 0 {
            return Err(anyhow!("Max attempts must be greater than zero"));
        }

        Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;

        Ok(())
    }

    /// Load the config file, writing a default one first if it does not exist.
    ///
    /// Returns the config and whether the file was created.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok((config, true))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            batching: BatchConfig::default(),
            input: InputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
