/*!
 * Classification of provider errors into retry categories.
 *
 * Vendors report throttling and overload in many different shapes (status codes,
 * JSON bodies, SDK messages). Every retry decision in the engine goes through
 * `classify`, so a newly observed error shape only needs a change here.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ProviderError;

/// Retry-relevant category of a provider error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The provider throttled us; back off harder
    RateLimit,
    /// The provider is temporarily unavailable
    Transient,
    /// Retrying cannot help (auth, malformed request, unknown)
    Hard,
}

impl ErrorClass {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorClass::Hard)
    }
}

/// Status codes treated as temporary server-side failures
pub const TRANSIENT_STATUS_CODES: &[u16] = &[500, 502, 503];

/// Status code for throttling
pub const RATE_LIMIT_STATUS_CODE: u16 = 429;

// Matches `X-RateLimit-Reset: 123`, `"X-RateLimit-Reset":"123"` and escaped JSON variants
static RESET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)x-ratelimit-reset[\\":\s]+(\d+)"#).unwrap());

/// Classify a raw error given its status code and message text.
///
/// Total: every input maps to a class. Message matching is case-insensitive and
/// treats `_` as a space so `RESOURCE_EXHAUSTED` and `rate_limit_exceeded` match.
pub fn classify(status_code: Option<u16>, message: &str) -> ErrorClass {
    let normalized = message.to_lowercase().replace('_', " ");

    if status_code == Some(RATE_LIMIT_STATUS_CODE)
        || normalized.contains("rate limit")
        || normalized.contains("resource exhausted")
    {
        return ErrorClass::RateLimit;
    }

    if status_code.is_some_and(|code| TRANSIENT_STATUS_CODES.contains(&code))
        || normalized.contains("overloaded")
    {
        return ErrorClass::Transient;
    }

    ErrorClass::Hard
}

/// Classify a provider error.
pub fn classify_error(error: &ProviderError) -> ErrorClass {
    match error {
        ProviderError::ApiError { status_code, message, .. } => classify(Some(*status_code), message),
        ProviderError::Timeout(_) => ErrorClass::Transient,
        ProviderError::Cancelled => ErrorClass::Hard,
        ProviderError::RequestFailed(message) | ProviderError::ParseError(message) => {
            classify(None, message)
        }
    }
}

/// Normalize a reset value to epoch milliseconds.
///
/// Values below 10^12 are taken as epoch seconds.
pub fn parse_reset_timestamp(raw: &str) -> Option<i64> {
    let value: i64 = raw.trim().parse().ok()?;
    if value <= 0 {
        return None;
    }
    if value < 1_000_000_000_000 {
        Some(value * 1000)
    } else {
        Some(value)
    }
}

/// Rate-limit reset time (epoch milliseconds) carried by an error, if any.
///
/// Prefers the value captured from response headers, then searches the body.
pub fn rate_limit_reset(error: &ProviderError) -> Option<i64> {
    match error {
        ProviderError::ApiError { rate_limit_reset_ms: Some(reset), .. } => Some(*reset),
        ProviderError::ApiError { message, .. } | ProviderError::RequestFailed(message) => {
            RESET_PATTERN
                .captures(message)
                .and_then(|caps| caps.get(1))
                .and_then(|m| parse_reset_timestamp(m.as_str()))
        }
        _ => None,
    }
}
