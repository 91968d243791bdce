//! Error types for tokenlog.

use thiserror::Error;

/// Main error type for detokenization and database loading.
///
/// Detokenization itself never returns these to callers of
/// [`Detokenizer::detokenize`](crate::Detokenizer::detokenize); they surface
/// from the lower-level extraction functions and from database loading.
#[derive(Debug, Error)]
pub enum DetokenizeError {
    /// Fewer than 4 bytes were available where a token was expected.
    #[error("Malformed frame: {len} bytes, need at least 4 for a token")]
    MalformedFrame { len: usize },

    /// A `$`-prefixed candidate matched the pattern but is not valid Base64.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// I/O error while reading a database or a log stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV token database could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON token database could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token database contents are invalid (bad token, missing column, etc.).
    #[error("Database error: {0}")]
    Database(String),
}

/// Result type alias using DetokenizeError.
pub type Result<T> = std::result::Result<T, DetokenizeError>;
