/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::failing(status)` - Always fails with the given HTTP status
 * - `MockProvider::fail_then_succeed(n, status)` - Fails `n` times, then succeeds
 * - `MockProvider::empty()` - Succeeds with an empty completion
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Returns the input unchanged
    Echo,
    /// Returns empty response
    Empty,
    /// Always fails with an API error carrying `status_code`
    Failing { status_code: u16 },
    /// Fails the first `failures` requests, then behaves like `Working`
    FailThenSucceed { failures: usize, status_code: u16 },
    /// Fails every request whose text contains the marker, translates the others
    FailOn { marker: &'static str, status_code: u16 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Texts received, in call order
    requests: Arc<Mutex<Vec<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a failing mock provider that always errors with `status_code`
    pub fn failing(status_code: u16) -> Self {
        Self::new(MockBehavior::Failing { status_code })
    }

    /// Create a mock that fails `failures` times before succeeding
    pub fn fail_then_succeed(failures: usize, status_code: u16) -> Self {
        Self::new(MockBehavior::FailThenSucceed { failures, status_code })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `complete` calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|texts| texts.clone()).unwrap_or_default()
    }

    /// The default translation produced by working mocks
    pub fn translate_text(text: &str) -> String {
        format!("[TRANSLATED] {}", text)
    }

    fn translated(&self, text: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text),
            None => Self::translate_text(text),
        }
    }

    fn simulated_error(status_code: u16, count: usize) -> ProviderError {
        let message = match status_code {
            429 => format!("Simulated rate limit exceeded (request #{})", count + 1),
            503 => format!("Simulated service unavailable (request #{})", count + 1),
            _ => format!("Simulated provider failure (request #{})", count + 1),
        };
        ProviderError::api(status_code, message)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, _system_prompt: &str, text: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(text.to_string());
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.translated(text)),

            MockBehavior::Echo => Ok(text.to_string()),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Failing { status_code } => Err(Self::simulated_error(status_code, count)),

            MockBehavior::FailThenSucceed { failures, status_code } => {
                if count < failures {
                    Err(Self::simulated_error(status_code, count))
                } else {
                    Ok(self.translated(text))
                }
            }

            MockBehavior::FailOn { marker, status_code } => {
                if text.contains(marker) {
                    Err(Self::simulated_error(status_code, count))
                } else {
                    Ok(self.translated(text))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
