//! Error types for the extraction client.

use thiserror::Error;

/// Errors that can occur when calling the language model.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Model returned a non-success status.
    #[error("model API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Model response did not contain the expected candidate text.
    #[error("unexpected model response: {0}")]
    InvalidResponse(String),

    /// Candidate text was not the requested JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
