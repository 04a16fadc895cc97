//! Error types for LLM provider operations.

use thiserror::Error;

/// Errors that can occur when talking to the LLM provider.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider host could not be reached.
    #[error("Cannot reach LLM provider at {host}")]
    Unreachable { host: String },

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No API key configured.
    #[error("No API key configured. Set LLM_API_KEY or llm.api_key in the config file.")]
    MissingApiKey,

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;
