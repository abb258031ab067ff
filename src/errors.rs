/*!
 * Error types for the doclingo engine.
 *
 * This module contains custom error types for the different layers of the engine,
 * using the thiserror crate for ergonomic error definitions:
 * - `ProviderError`: a single call to a translation provider failed
 * - `DocumentError`: the document container could not be read or written
 * - `TranslationError`: a whole document translation was aborted
 * - `AppError`: top-level wrapper used by the command line tool
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails at the transport level
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error body returned by the API
        message: String,
        /// Rate-limit reset time (epoch milliseconds) announced by the provider, if any
        rate_limit_reset_ms: Option<i64>,
    },

    /// The call did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The call was abandoned because the operation was cancelled
    #[error("Request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Shorthand for an API error without a reset hint
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status_code,
            message: message.into(),
            rate_limit_reset_ms: None,
        }
    }

    /// HTTP status code carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Errors that can occur while reading or writing a document container
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The container or one of its XML parts cannot be parsed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The container is a valid archive but not a supported document type
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The document holds no translatable paragraph
    #[error("No content: the document contains no translatable text")]
    NoContent,

    /// Serializing or repackaging the document failed
    #[error("Failed to write document: {0}")]
    Write(String),
}

/// Errors that abort the translation of a whole document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with the document container
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Missing or inconsistent configuration (credentials, endpoints, models)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The translation was cancelled by the caller
    #[error("Translation cancelled")]
    Cancelled,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Process exit code reported by the command line tool
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Translation(TranslationError::Configuration(_)) => 2,
            Self::Translation(TranslationError::Cancelled)
            | Self::Translation(TranslationError::Provider(ProviderError::Cancelled))
            | Self::Provider(ProviderError::Cancelled) => 130,
            _ => 1,
        }
    }
}

// Typed errors keep their variant even when wrapped in context
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<TranslationError>() {
            Ok(e) => return Self::Translation(e),
            Err(error) => error,
        };
        let error = match error.downcast::<DocumentError>() {
            Ok(e) => return Self::Document(e),
            Err(error) => error,
        };
        let error = match error.downcast::<ProviderError>() {
            Ok(e) => return Self::Provider(e),
            Err(error) => error,
        };
        match error.downcast::<std::io::Error>() {
            Ok(e) => Self::from(e),
            Err(error) => Self::Unknown(format!("{:#}", error)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
