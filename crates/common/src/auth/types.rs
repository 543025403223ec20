//! Token and refresh-endpoint types
//!
//! The refresh endpoint contract is modelled as explicit tagged results so a
//! response missing a token is a distinct, checked branch rather than an
//! optimistic field access.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access and refresh tokens issued together by the API
///
/// The two values are only ever written as a unit; there is no way to
/// replace one without the other.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token attached to same-origin requests
    pub access_token: String,

    /// Long-lived token exchanged for a fresh pair
    pub refresh_token: String,
}

impl TokenPair {
    /// Create a new token pair
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }

    /// `Authorization` header value for the access token
    #[must_use]
    pub fn bearer(&self) -> String {
        bearer_value(&self.access_token)
    }
}

/// `Authorization` header value for a bare access token
#[must_use]
pub fn bearer_value(access_token: &str) -> String {
    format!("Bearer {access_token}")
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Body returned by `POST /api/auth/refresh`
///
/// Both fields are optional at the wire level; [`RefreshResponse::into_pair`]
/// turns an incomplete body into [`RefreshFailure::MalformedBody`]. Extra
/// fields (user profile and the like) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl RefreshResponse {
    /// Validate the body into a usable token pair
    ///
    /// # Errors
    /// Returns [`RefreshFailure::MalformedBody`] when either token is missing
    /// or empty.
    pub fn into_pair(self) -> Result<TokenPair, RefreshFailure> {
        match (self.access_token, self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Ok(TokenPair::new(access, refresh))
            }
            (access, _) if access.as_deref().map_or(true, str::is_empty) => {
                Err(RefreshFailure::MalformedBody("missing accessToken".to_string()))
            }
            _ => Err(RefreshFailure::MalformedBody("missing refreshToken".to_string())),
        }
    }
}

/// Why a refresh attempt did not yield a new token pair
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// No refresh token was stored; no request was made
    #[error("no refresh token available")]
    NoRefreshToken,

    /// Endpoint answered with a non-success status
    #[error("refresh rejected with status {status}")]
    Rejected { status: u16 },

    /// Endpoint answered 2xx but the body was unusable
    #[error("malformed refresh response: {0}")]
    MalformedBody(String),

    /// Request could not complete
    #[error("refresh request failed: {0}")]
    Network(String),

    /// New pair could not be persisted
    #[error("could not persist refreshed tokens: {0}")]
    Storage(String),
}

/// Result of exchanging a refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Success(TokenPair),
    Failure(RefreshFailure),
}

impl RefreshOutcome {
    /// `true` for [`RefreshOutcome::Success`]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<TokenPair, RefreshFailure>> for RefreshOutcome {
    fn from(result: Result<TokenPair, RefreshFailure>) -> Self {
        match result {
            Ok(pair) => Self::Success(pair),
            Err(failure) => Self::Failure(failure),
        }
    }
}

/// Credential storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("keychain error: {0}")]
    Keychain(String),

    /// Blocking storage task panicked or was cancelled
    #[error("credential store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for tradeport_domain::TradePortError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
