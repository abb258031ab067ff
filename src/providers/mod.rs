/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - Gemini: Google Generative Language API (vendor request/response shape)
 * - OpenAI-compatible: OpenAI, OpenRouter, Ollama and vLLM through `/chat/completions`
 * - Mock: scripted provider used by the tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{ProviderConfig, ProviderKind};
use crate::errors::{ProviderError, TranslationError};

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation client.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate `text` following `system_prompt`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The model output (possibly empty) or an error
    async fn complete(&self, system_prompt: &str, text: &str) -> Result<String, ProviderError>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}

/// Build the adapter for a registry entry.
///
/// Gemini uses its own wire format; every other provider speaks the
/// OpenAI-compatible chat completions protocol.
pub fn adapter_for(
    config: &ProviderConfig,
    timeout: Duration,
    temperature: f32,
) -> Result<Arc<dyn Provider>, TranslationError> {
    config.validate()?;
    let base_url = config.base_url()?;
    let model = config.model()?;

    let provider: Arc<dyn Provider> = match config.provider {
        ProviderKind::Gemini => Arc::new(
            gemini::Gemini::new(config.api_key().unwrap_or_default(), base_url, model, timeout)
                .with_temperature(temperature),
        ),
        ProviderKind::OpenAI | ProviderKind::OpenRouter | ProviderKind::Ollama | ProviderKind::Vllm => Arc::new(
            openai::OpenAI::new(
                config.provider.to_lowercase_string(),
                config.api_key().map(str::to_string),
                base_url,
                model,
                timeout,
            )
            .with_temperature(temperature),
        ),
    };

    Ok(provider)
}

/// Map a transport error to a provider error
pub(crate) fn request_error(error: reqwest::Error, timeout: Duration) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

pub mod gemini;
pub mod mock;
pub mod openai;
