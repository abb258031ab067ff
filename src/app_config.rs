use anyhow::{Context, Result as AnyResult, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::TranslationError;
use crate::translation::dispatcher::DispatchOptions;
use crate::translation::prompts::GlossaryItem;
use crate::translation::retry::RetryPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language, either an ISO code ("fr", "deu") or a free-form name ("Simplified Chinese")
    pub target_language: String,

    /// Forced terminology, injected verbatim into the system prompt
    #[serde(default)]
    pub glossary: Vec<GlossaryItem>,

    /// Translation config
    pub translation: TranslationConfig,

    /// Document rewriting options
    #[serde(default)]
    pub document: DocumentConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Google Gemini (vendor API)
    #[default]
    Gemini,
    // @provider: OpenRouter (OpenAI-compatible, hosted)
    OpenRouter,
    // @provider: Ollama (OpenAI-compatible local server)
    Ollama,
    // @provider: vLLM (OpenAI-compatible local server)
    Vllm,
    // @provider: Any other OpenAI-compatible endpoint
    OpenAI,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenRouter => "OpenRouter",
            Self::Ollama => "Ollama",
            Self::Vllm => "vLLM",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenRouter => "openrouter".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::Vllm => "vllm".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }

    /// Local servers run without credentials
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama | Self::Vllm)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> AnyResult<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            "vllm" => Ok(Self::Vllm),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// One entry of the provider registry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider identifier
    #[serde(rename = "id")]
    pub provider: ProviderKind,

    // @field: API key ("EMPTY" or blank for none)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service base URL
    #[serde(default)]
    pub base_url: Option<String>,

    // @field: Model name
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderConfig {
    // @param provider: Provider enum
    // @returns: Registry entry with the provider's well-known endpoint and model
    pub fn new(provider: ProviderKind) -> Self {
        let (base_url, model) = match provider {
            ProviderKind::Gemini => ("https://generativelanguage.googleapis.com", "gemini-2.5-flash"),
            ProviderKind::OpenRouter => ("https://openrouter.ai/api/v1", "openai/gpt-3.5-turbo"),
            ProviderKind::Ollama => ("http://localhost:11434/v1", "llama3"),
            ProviderKind::Vllm => ("http://localhost:8000/v1", "facebook/opt-125m"),
            ProviderKind::OpenAI => ("https://api.openai.com/v1", "gpt-4o-mini"),
        };

        Self {
            provider,
            api_key: String::new(),
            base_url: Some(base_url.to_string()),
            model: Some(model.to_string()),
        }
    }

    /// The API key, or `None` when blank or the `EMPTY` placeholder
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        if key.is_empty() || key == "EMPTY" {
            None
        } else {
            Some(key)
        }
    }

    /// Base URL of the provider, required to be present in the registry
    pub fn base_url(&self) -> Result<&str, TranslationError> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                TranslationError::Configuration(format!(
                    "No base URL configured for provider {}",
                    self.provider
                ))
            })
    }

    /// Model name, required to be present in the registry
    pub fn model(&self) -> Result<&str, TranslationError> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .ok_or_else(|| {
                TranslationError::Configuration(format!(
                    "No model configured for provider {}",
                    self.provider
                ))
            })
    }

    /// Check that this entry can be used to issue requests
    pub fn validate(&self) -> Result<(), TranslationError> {
        let base_url = self.base_url()?;
        Url::parse(base_url).map_err(|e| {
            TranslationError::Configuration(format!(
                "Invalid base URL '{}' for provider {}: {}",
                base_url, self.provider, e
            ))
        })?;
        self.model()?;

        if self.provider.requires_api_key() && self.api_key().is_none() {
            return Err(TranslationError::Configuration(format!(
                "An API key is required for the {} provider",
                self.provider.display_name()
            )));
        }

        Ok(())
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: ProviderKind,

    /// Provider registry
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Maximum number of attempts per unit, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Minimum delay in milliseconds between two batches of units (0 for batch callers)
    #[serde(default = "default_inter_unit_delay_ms")]
    pub inter_unit_delay_ms: u64,

    /// Number of units translated together
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-call request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            inter_unit_delay_ms: default_inter_unit_delay_ms(),
            batch_size: default_batch_size(),
            request_timeout_secs: default_request_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

/// Options for writing translated documents back
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentConfig {
    /// Shrink slide fonts when the translation is visibly wider than the original
    #[serde(default = "default_true")]
    pub auto_fit_font: bool,

    /// Typeface applied to every slide, master and layout after translation
    #[serde(default)]
    pub replacement_font: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            auto_fit_font: true,
            replacement_font: None,
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

fn default_max_attempts() -> u32 {
    7
}

fn default_retry_backoff_ms() -> u64 {
    2000 // doubled on each retry
}

fn default_inter_unit_delay_ms() -> u64 {
    200
}

fn default_batch_size() -> usize {
    1
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.1
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnyResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write this configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AnyResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.target_language.trim().is_empty() {
            return Err(TranslationError::Configuration(
                "Target language must not be empty".to_string(),
            ));
        }

        let provider = self.translation.get_active_provider_config().ok_or_else(|| {
            TranslationError::Configuration(format!(
                "Provider {} is not present in available_providers",
                self.translation.provider
            ))
        })?;
        provider.validate()?;

        if self.translation.common.max_attempts == 0 {
            return Err(TranslationError::Configuration(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: "fr".to_string(),
            glossary: Vec::new(),
            translation: TranslationConfig::default(),
            document: DocumentConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by kind
    pub fn get_provider_config(&self, provider: &ProviderKind) -> Option<&ProviderConfig> {
        self.available_providers.iter().find(|p| p.provider == *provider)
    }

    /// Mutable access to a registry entry, used by command line overrides
    pub fn get_provider_config_mut(&mut self, provider: &ProviderKind) -> Option<&mut ProviderConfig> {
        self.available_providers.iter_mut().find(|p| p.provider == *provider)
    }

    /// Retry policy derived from the common settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.common.max_attempts.max(1),
            base_delay: Duration::from_millis(self.common.retry_backoff_ms),
            ..RetryPolicy::default()
        }
    }

    /// Dispatcher pacing derived from the common settings
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            batch_size: self.common.batch_size.max(1),
            min_inter_unit_delay: Duration::from_millis(self.common.inter_unit_delay_ms),
        }
    }

    /// Per-call request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.common.request_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            available_providers: vec![
                ProviderConfig::new(ProviderKind::Gemini),
                ProviderConfig::new(ProviderKind::OpenRouter),
                ProviderConfig::new(ProviderKind::Ollama),
                ProviderConfig::new(ProviderKind::Vllm),
                ProviderConfig::new(ProviderKind::OpenAI),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
