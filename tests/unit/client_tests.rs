/*!
 * Tests for the translation client and its retry policy
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use doclingo::errors::ProviderError;
use doclingo::providers::Provider;
use doclingo::providers::mock::MockProvider;
use doclingo::providers::openai::OpenAI;
use doclingo::translation::{ErrorClass, RetryPolicy, TranslationClient, TranslationOutcome, classify_error};
use crate::common;

const PROMPT: &str = "Translate to French";

/// Test that purely symbolic text is returned without a provider call
#[tokio::test]
async fn test_translate_symbolsOnly_shouldSkipProvider() {
    let provider = MockProvider::working();
    let client = common::mock_client(&provider);

    let result = client.translate("— ( ) !", PROMPT).await.unwrap();

    assert_eq!(result, "— ( ) !");
    assert_eq!(provider.request_count(), 0);
}

/// Test that a lone Latin letter is passed through but a lone ideograph is sent
#[tokio::test]
async fn test_translate_singleCharacter_shouldOnlySendCjk() {
    let provider = MockProvider::working();
    let client = common::mock_client(&provider);

    assert_eq!(client.translate("A", PROMPT).await.unwrap(), "A");
    assert_eq!(provider.request_count(), 0);

    let result = client.translate("我", PROMPT).await.unwrap();
    assert_eq!(result, MockProvider::translate_text("我"));
    assert_eq!(provider.request_count(), 1);
}

/// Test that numbers with units still reach the provider
#[tokio::test]
async fn test_translate_textWithLetters_shouldCallProvider() {
    let provider = MockProvider::working();
    let client = common::mock_client(&provider);

    client.translate("12 kg", PROMPT).await.unwrap();

    assert_eq!(provider.requests(), vec!["12 kg".to_string()]);
}

/// Test that a rate-limited provider succeeds on the third attempt after backing off
#[tokio::test(start_paused = true)]
async fn test_translate_rateLimitedTwice_shouldSucceedOnThirdAttempt() {
    let provider = MockProvider::fail_then_succeed(2, 429);
    let policy = RetryPolicy::default();
    let base_delay = policy.base_delay;
    let client = TranslationClient::new(Arc::new(provider.clone()), policy);

    let started = tokio::time::Instant::now();
    let result = client.translate("Hello", PROMPT).await.unwrap();
    let slept = started.elapsed();

    assert_eq!(result, MockProvider::translate_text("Hello"));
    assert_eq!(provider.request_count(), 3);
    assert!(slept >= base_delay * (1 + 2), "slept only {:?}", slept);
}

/// Test that transient failures are retried with doubling delays
#[tokio::test(start_paused = true)]
async fn test_translate_transientFailures_shouldWaitExponentially() {
    let provider = MockProvider::fail_then_succeed(3, 503);
    let policy = RetryPolicy {
        max_jitter: Duration::ZERO,
        ..RetryPolicy::new(7, Duration::from_millis(100))
    };
    let client = TranslationClient::new(Arc::new(provider.clone()), policy);

    let started = tokio::time::Instant::now();
    client.translate("Hello", PROMPT).await.unwrap();

    // 100 + 200 + 400
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(700), "slept only {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(710), "slept {:?}", elapsed);
    assert_eq!(provider.request_count(), 4);
}

/// Test that a permanently unavailable provider is tried exactly max_attempts times
#[tokio::test(start_paused = true)]
async fn test_translate_alwaysUnavailable_shouldReraiseAfterMaxAttempts() {
    let provider = MockProvider::failing(503);
    let client = TranslationClient::new(
        Arc::new(provider.clone()),
        RetryPolicy::new(4, Duration::from_millis(10)),
    );

    let error = client.translate("Hello", PROMPT).await.unwrap_err();

    assert_eq!(error.status_code(), Some(503));
    assert_eq!(provider.request_count(), 4);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(provider.request_count(), 4);
}

/// Test that a hard error is not retried
#[tokio::test]
async fn test_translate_authFailure_shouldNotRetry() {
    let provider = MockProvider::failing(401);
    let client = common::mock_client(&provider);

    let error = client.translate("Hello", PROMPT).await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { status_code: 401, .. }));
    assert_eq!(provider.request_count(), 1);
}

/// Test that an empty completion keeps the original text and is flagged
#[tokio::test]
async fn test_translateDetailed_emptyCompletion_shouldDegrade() {
    let provider = MockProvider::empty();
    let client = common::mock_client(&provider);

    let outcome = client.translate_detailed("Hello", PROMPT).await.unwrap();

    assert_eq!(outcome, TranslationOutcome::Degraded("Hello".to_string()));
    assert!(outcome.is_degraded());
    assert_eq!(provider.request_count(), 1);
}

/// Test that a cancelled token stops the client before any call
#[tokio::test]
async fn test_translate_cancelledBeforeStart_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let token = CancellationToken::new();
    token.cancel();
    let client = common::mock_client(&provider).with_cancellation(token);

    let error = client.translate("Hello", PROMPT).await.unwrap_err();

    assert_eq!(error, ProviderError::Cancelled);
    assert_eq!(provider.request_count(), 0);
}

/// Test that cancelling during a backoff sleep ends the retry loop
#[tokio::test(start_paused = true)]
async fn test_translate_cancelledDuringBackoff_shouldStopRetrying() {
    let provider = MockProvider::failing(503);
    let token = CancellationToken::new();
    let client = TranslationClient::new(Arc::new(provider.clone()), RetryPolicy::default())
        .with_cancellation(token.clone());

    let handle = tokio::spawn(async move { client.translate("Hello", PROMPT).await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    token.cancel();

    let result = handle.await.unwrap();
    assert_eq!(result, Err(ProviderError::Cancelled));
    assert_eq!(provider.request_count(), 1);
}

/// Starts a server that accepts connections but never answers; returns its base URL and accept count
async fn silent_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            open.push(socket);
        }
    });

    (format!("http://{}/v1", address), accepted)
}

/// Test that a call exceeding the per-call timeout surfaces as a retryable timeout
#[tokio::test]
async fn test_complete_unresponsiveServer_shouldTimeOut() {
    let (base_url, _) = silent_server().await;
    let adapter = OpenAI::new("ollama", None, base_url, "llama3", Duration::from_millis(200));

    let error = adapter.complete(PROMPT, "Hello").await.unwrap_err();

    assert_eq!(error, ProviderError::Timeout(Duration::from_millis(200)));
    assert_eq!(classify_error(&error), ErrorClass::Transient);
}

/// Test that timed-out calls are retried until the attempts run out
#[tokio::test]
async fn test_translate_unresponsiveServer_shouldRetryTimeouts() {
    let (base_url, accepted) = silent_server().await;
    let adapter = OpenAI::new("ollama", None, base_url, "llama3", Duration::from_millis(200));
    let client = TranslationClient::new(Arc::new(adapter), common::fast_policy(2));

    let error = client.translate("Hello", PROMPT).await.unwrap_err();

    assert!(matches!(error, ProviderError::Timeout(_)));
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}
