//! Conversions from external infrastructure errors into API and domain errors.

use reqwest::Error as HttpError;
use tradeport_common::auth::{StoreError, TokenManagerError};
use tradeport_domain::TradePortError;

use crate::api::errors::ApiError;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }

        if err.is_builder() {
            return Self::InvalidRequest(err.to_string());
        }

        if err.is_decode() || err.is_body() {
            return Self::Decode(err.to_string());
        }

        Self::Network(err.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* url / serde_json / storage → ApiError */
/* -------------------------------------------------------------------------- */

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidRequest(format!("invalid URL: {err}"))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<TokenManagerError> for ApiError {
    fn from(err: TokenManagerError) -> Self {
        match err {
            TokenManagerError::Storage(inner) => inner.into(),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* ApiError ↔ TradePortError */
/* -------------------------------------------------------------------------- */

impl From<ApiError> for TradePortError {
    fn from(err: ApiError) -> Self {
        let unauthorized = err.is_unauthorized();
        match err {
            ApiError::Status { .. } if unauthorized => Self::Auth(err.to_string()),
            ApiError::Status { .. } | ApiError::Decode(_) => Self::Network(err.to_string()),
            ApiError::Network(message) => Self::Network(message),
            ApiError::Timeout => Self::Network("request timed out".to_string()),
            ApiError::InvalidRequest(message) => Self::InvalidInput(message),
            ApiError::Config(message) => Self::Config(message),
            ApiError::Storage(message) => Self::Storage(message),
        }
    }
}

impl From<TradePortError> for ApiError {
    fn from(err: TradePortError) -> Self {
        match err {
            TradePortError::Config(message) => Self::Config(message),
            TradePortError::Network(message) => Self::Network(message),
            TradePortError::Storage(message) => Self::Storage(message),
            TradePortError::Auth(message) => {
                Self::Status { status: reqwest::StatusCode::UNAUTHORIZED, message }
            }
            TradePortError::InvalidInput(message) | TradePortError::Internal(message) => {
                Self::InvalidRequest(message)
            }
        }
    }
}
