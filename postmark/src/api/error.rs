use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Failed to encode request body: {0}")]
    SerializeError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("API returned error (HTTP {status}, code {error_code}): {message}")]
    ApiError {
        status: u16,
        error_code: i64,
        message: String,
    },

    #[error("API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

/// Error body returned by Postmark for rejected requests
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostmarkErrorResponse {
    pub error_code: i64,
    pub message: String,
}
