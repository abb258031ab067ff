/*!
 * Resilient, provider-abstracted translation client.
 *
 * Each call goes through three stages:
 * - trivial inputs (symbols, digits, isolated non-CJK characters) are returned unchanged
 * - the provider adapter is called under the retry policy
 * - an empty completion falls back to the original text
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::app_config::{ProviderConfig, TranslationConfig};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{Provider, adapter_for};
use crate::translation::retry::RetryPolicy;

// Digits, whitespace, punctuation and symbols only
static SYMBOLIC_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s\p{P}\p{S}]+$").unwrap());

/// Result of a single translation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The provider returned a translation
    Translated(String),
    /// The input was passed through without a provider call
    Bypassed(String),
    /// The provider answered with empty content; the original text is kept
    Degraded(String),
}

impl TranslationOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(text) | Self::Bypassed(text) | Self::Degraded(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Translated(text) | Self::Bypassed(text) | Self::Degraded(text) => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// True when `text` never needs to reach a provider.
///
/// Blank text, text made only of digits, whitespace, punctuation or symbols, and
/// a single character outside the CJK ideograph block are passed through.
pub fn should_bypass(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || SYMBOLIC_TEXT.is_match(text) {
        return true;
    }

    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(only), None) => !is_cjk_ideograph(only),
        _ => false,
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Translation client wrapping one provider adapter with retries
#[derive(Debug, Clone)]
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl TranslationClient {
    /// Create a client around an adapter
    pub fn new(provider: Arc<dyn Provider>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a client for a registry entry using the common translation settings
    pub fn from_config(provider: &ProviderConfig, translation: &TranslationConfig) -> Result<Self, TranslationError> {
        let adapter = adapter_for(
            provider,
            translation.request_timeout(),
            translation.common.temperature,
        )?;
        Ok(Self::new(adapter, translation.retry_policy()))
    }

    /// Observe `token` before every attempt and during every backoff sleep
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Translate `text`, returning either a string or the last classified error
    pub async fn translate(&self, text: &str, system_prompt: &str) -> Result<String, ProviderError> {
        self.translate_detailed(text, system_prompt)
            .await
            .map(TranslationOutcome::into_text)
    }

    /// Translate `text` and report how the result was obtained
    pub async fn translate_detailed(&self, text: &str, system_prompt: &str) -> Result<TranslationOutcome, ProviderError> {
        if should_bypass(text) {
            debug!("Skipping provider call for trivial text: {:?}", text);
            return Ok(TranslationOutcome::Bypassed(text.to_string()));
        }

        let provider = Arc::clone(&self.provider);
        let content = self
            .policy
            .run(&self.cancel, || {
                let provider = Arc::clone(&provider);
                async move { provider.complete(system_prompt, text).await }
            })
            .await?;

        if content.trim().is_empty() {
            warn!(
                "{} returned an empty translation, keeping the original text",
                self.provider.name()
            );
            return Ok(TranslationOutcome::Degraded(text.to_string()));
        }

        Ok(TranslationOutcome::Translated(content))
    }
}
