//! API-specific error types
//!
//! Provides error classification for API operations so callers can branch on
//! authentication failures versus application errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403) - caller should send the user to login
    Authentication,
    /// Rate limiting errors (429)
    RateLimit,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except auth), undecodable payloads, bad requests
    Client,
    /// Network/connection errors and timeouts
    Network,
    /// Configuration and storage errors
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is the response body, or the status reason
    /// phrase when the body is empty
    #[error("{}: {message}", status.as_u16())]
    Status { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Status { status, .. } => {
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN {
                    ApiErrorCategory::Authentication
                } else if *status == StatusCode::TOO_MANY_REQUESTS {
                    ApiErrorCategory::RateLimit
                } else if status.is_server_error() {
                    ApiErrorCategory::Server
                } else {
                    ApiErrorCategory::Client
                }
            }
            Self::Network(_) | Self::Timeout => ApiErrorCategory::Network,
            Self::Decode(_) | Self::InvalidRequest(_) => ApiErrorCategory::Client,
            Self::Config(_) | Self::Storage(_) => ApiErrorCategory::Config,
        }
    }

    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for a 401 response
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
