// ABOUTME: Error types for the server HTTP API
// Application-level failures are payloads with success=false, not errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid server URL {0}: {1}")]
    InvalidBaseUrl(String, String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server reported success without a session id")]
    MissingSessionId,
}
