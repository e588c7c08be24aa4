//! Error types for the application
//!
//! Defines the failure taxonomy for backend calls, the state store, and
//! token persistence. API errors are converted to user-visible strings at
//! the point where completion events are applied; they are never rethrown.

use thiserror::Error;

/// Errors produced by calls to the assistant backend
///
/// Single-attempt semantics: there are no retries, so every variant maps
/// directly to one failed request.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request exceeded the client-wide timeout
    #[error("Request timed out")]
    Timeout,

    /// The request never produced a response (DNS, connect, transport)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, as text (may be an error JSON payload)
        body: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Errors produced by the application store
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The store was read or mutated before initialization (or after shutdown)
    #[error("Store is not initialized")]
    Uninitialized,
}

/// Errors produced by the persisted token store
#[derive(Error, Debug)]
pub enum TokenStoreError {
    /// File I/O error while reading or writing the token file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The token file held malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
