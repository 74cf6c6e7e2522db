use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::file_utils::FileManager;
use crate::formats::FormatKind;
use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
///
/// The store is one flat JSON object. Missing keys take their defaults and
/// keys this version does not know are kept, so a save never loses them.

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "subtrans.json";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    // @field: Source language code, or "auto"
    #[serde(default = "default_source_language")]
    pub default_source_language: String,

    // @field: Target language code
    #[serde(default = "default_target_language")]
    pub default_target_language: String,

    // @field: Provider used for translation
    #[serde(default)]
    pub translation_engine: Engine,

    // @field: Total provider attempts per text
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    // @field: Base retry delay, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // @field: Minimum gap between two provider requests
    #[serde(default = "default_delay_between_requests_ms")]
    pub delay_between_requests_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    // @field: Cache database file; empty means the platform data directory
    #[serde(default)]
    pub cache_path: String,

    // @field: Age after which single-use cache entries are cleaned
    #[serde(default = "default_cache_max_age_days")]
    pub cache_max_age_days: u32,

    #[serde(default = "default_true")]
    pub create_backup: bool,

    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    #[serde(default)]
    pub output_format: OutputFormat,

    // @field: Files translated at once in a batch
    #[serde(default = "default_concurrent_files")]
    pub concurrent_files: usize,

    #[serde(default = "default_ollama_endpoint")]
    pub ollama_endpoint: String,

    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    #[serde(default = "default_openai_endpoint")]
    pub openai_endpoint: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default)]
    pub openai_api_key: String,

    #[serde(default = "default_lmstudio_endpoint")]
    pub lmstudio_endpoint: String,

    #[serde(default = "default_lmstudio_model")]
    pub lmstudio_model: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    // @field: Keys not known to this version, preserved on save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Translation engine
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl Engine {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
            Self::LMStudio => "lmstudio",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Engine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(ConfigError::Invalid(format!("unknown translation engine: {}", s))),
        }
    }
}

/// Output format setting
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Keep the input format
    #[default]
    Same,
    Srt,
    Ass,
    Vtt,
}

impl OutputFormat {
    /// `None` for [`OutputFormat::Same`]
    pub fn format_kind(&self) -> Option<FormatKind> {
        match self {
            Self::Same => None,
            Self::Srt => Some(FormatKind::Srt),
            Self::Ass => Some(FormatKind::Ass),
            Self::Vtt => Some(FormatKind::Vtt),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
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
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    language_utils::AUTO.to_string()
}

fn default_target_language() -> String {
    "ar".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_delay_between_requests_ms() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cache_max_age_days() -> u32 {
    30
}

fn default_output_suffix() -> String {
    "_translated".to_string()
}

fn default_concurrent_files() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio's OpenAI-compatible server runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_lmstudio_model() -> String {
    "local-model".to_string()
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_source_language: default_source_language(),
            default_target_language: default_target_language(),
            translation_engine: Engine::default(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            delay_between_requests_ms: default_delay_between_requests_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_enabled: true,
            cache_path: String::new(),
            cache_max_age_days: default_cache_max_age_days(),
            create_backup: true,
            output_suffix: default_output_suffix(),
            output_format: OutputFormat::default(),
            concurrent_files: default_concurrent_files(),
            ollama_endpoint: default_ollama_endpoint(),
            ollama_model: default_ollama_model(),
            openai_endpoint: default_openai_endpoint(),
            openai_model: default_openai_model(),
            openai_api_key: String::new(),
            lmstudio_endpoint: default_lmstudio_endpoint(),
            lmstudio_model: default_lmstudio_model(),
            log_level: LogLevel::default(),
            extra: Map::new(),
        }
    }
}

impl Config {
    /// Read and parse a configuration file
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration, merged over the defaults
    ///
    /// A missing file gives the defaults. An unreadable or malformed file is
    /// reported and also gives the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No configuration at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using default configuration", e);
                Self::default()
            }
        }
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |message: String| ConfigError::Write {
            path: path.to_path_buf(),
            message,
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;
        FileManager::write_to_file(path, &json).map_err(|e| write_error(format!("{:#}", e)))
    }

    /// Restore every setting to its default
    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    fn to_map(&self) -> Result<Map<String, Value>, ConfigError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ConfigError::Invalid("configuration is not an object".to_string())),
            Err(e) => Err(ConfigError::Invalid(e.to_string())),
        }
    }

    /// Raw value of a key, known or not
    pub fn get(&self, key: &str) -> Option<Value> {
        self.to_map().ok()?.remove(key)
    }

    /// Set a raw key; a value of the wrong type for a known key is rejected
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        let mut map = self.to_map()?;
        map.insert(key.to_string(), value);
        *self = serde_json::from_value(Value::Object(map))
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", key, e)))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        language_utils::validate_language_code(&self.default_source_language)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if language_utils::is_auto(&self.default_target_language) {
            return Err(ConfigError::Invalid("target language cannot be auto".to_string()));
        }
        language_utils::validate_language_code(&self.default_target_language)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".to_string()));
        }
        if self.concurrent_files == 0 {
            return Err(ConfigError::Invalid("concurrent_files must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".to_string()));
        }

        let endpoint = self.engine_endpoint();
        if url::Url::parse(endpoint).is_err() && url::Url::parse(&format!("http://{}", endpoint)).is_err() {
            return Err(ConfigError::Invalid(format!("invalid endpoint: {}", endpoint)));
        }

        if self.translation_engine == Engine::OpenAI && self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("openai_api_key is required for the openai engine".to_string()));
        }

        Ok(())
    }

    /// Model for the selected engine
    pub fn engine_model(&self) -> &str {
        match self.translation_engine {
            Engine::Ollama => &self.ollama_model,
            Engine::OpenAI => &self.openai_model,
            Engine::LMStudio => &self.lmstudio_model,
        }
    }

    /// Endpoint for the selected engine
    pub fn engine_endpoint(&self) -> &str {
        match self.translation_engine {
            Engine::Ollama => &self.ollama_endpoint,
            Engine::OpenAI => &self.openai_endpoint,
            Engine::LMStudio => &self.lmstudio_endpoint,
        }
    }

    /// Override the model of the selected engine
    pub fn set_engine_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        match self.translation_engine {
            Engine::Ollama => self.ollama_model = model,
            Engine::OpenAI => self.openai_model = model,
            Engine::LMStudio => self.lmstudio_model = model,
        }
    }

    /// Explicit cache database location, if one is configured
    pub fn cache_file(&self) -> Option<PathBuf> {
        let trimmed = self.cache_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_max_age_days) * 24 * 60 * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn delay_between_requests(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms)
    }
}
