/*!
 * Resilient translation engine.
 *
 * This module contains the provider-facing side of document translation.
 * It is split into several submodules:
 *
 * - `prompts`: System instruction with translation rules and glossary
 * - `classifier`: Mapping of provider errors to retry categories
 * - `retry`: Exponential backoff driven by the classifier
 * - `client`: Provider calls with trivial-text short-circuits and retries
 * - `dispatcher`: Ordered per-unit driver with progress events and statistics
 */

// Re-export main types for easier usage
pub use self::classifier::{ErrorClass, classify, classify_error};
pub use self::client::{TranslationClient, TranslationOutcome, should_bypass};
pub use self::dispatcher::{
    DispatchOptions, DispatchOutcome, DispatchState, DispatchStats, Dispatcher, ProgressEvent, ProgressPhase,
};
pub use self::prompts::{GlossaryItem, TranslationPromptBuilder, build_system_prompt};
pub use self::retry::{RetryPolicy, RetryState};

// Submodules
pub mod classifier;
pub mod client;
pub mod dispatcher;
pub mod prompts;
pub mod retry;
