/*!
 * Error types for the aisub library.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
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
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors that can occur while loading or decoding subtitle text
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubtitleError {
    /// The text matches no known or convertible caption grammar
    #[error("Cannot convert to a valid SRT file")]
    UnsupportedFormat,

    /// The input exceeds the size ceiling and was rejected before parsing
    #[error("File too large: {size} bytes (max {limit} bytes)")]
    FileTooLarge {
        /// Size of the rejected input in bytes
        size: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },

    /// The bytes could not be decoded as text
    #[error("Cannot open as text file")]
    NotText,
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the backend transport
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The backend answered with an explicit error message
    #[error("{0}")]
    Api(String),

    /// The backend returned a different number of sentences than it was sent
    #[error("Expected {expected} translated sentences, got {actual}")]
    MismatchedResponse {
        /// Number of sentences sent
        expected: usize,
        /// Number of sentences received
        actual: usize,
    },

    /// The backend redirected to a purchase flow
    #[error("redirected to {location}")]
    Redirected {
        /// Redirect target reported by the backend
        location: String,
    },

    /// The backend throttled the request and the caller must bring its own key
    #[error("rate limited. Please enter your API key")]
    RateLimited,

    /// The run was stopped through its cancellation token
    #[error("translation cancelled")]
    Cancelled,

    /// A batch could not be translated, so the whole document run was aborted
    #[error("translate file failed at batch {batch_index} ({batch_content}): {source}")]
    Document {
        /// Zero-based index of the failed batch
        batch_index: usize,
        /// Content of the failed batch, for diagnosis
        batch_content: String,
        /// Last error observed for the batch
        #[source]
        source: Box<TranslationError>,
    },
}

impl TranslationError {
    /// Whether another attempt with the same credentials may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Api(_) | Self::MismatchedResponse { .. }
        )
    }
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

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
