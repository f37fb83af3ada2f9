//! Error types for the QQ Music client.

use cadenza_core::CoreError;
use thiserror::Error;

/// Errors that can occur while talking to the QQ Music endpoints.
#[derive(Debug, Error)]
pub enum QqMusicError {
    /// Building the HTTP client or reading a response body failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request failed after retries.
    #[error("HTTP request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("Unexpected HTTP status {status}")]
    Status { status: reqwest::StatusCode },

    /// The endpoint answered with a non-zero result code.
    #[error("QQ Music API returned code {code}")]
    Api { code: i64 },

    #[error("Response is missing {field}")]
    MissingField { field: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<QqMusicError> for CoreError {
    fn from(e: QqMusicError) -> Self {
        Self::provider(crate::PROVIDER_NAME, e)
    }
}
