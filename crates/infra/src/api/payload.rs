//! Response payload decoding

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::errors::ApiError;

/// Decoded body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    /// 204 No Content, or a 401 mapped to "no data"
    Null,
    Json(Value),
    Text(String),
}

impl ApiPayload {
    /// Decode a successful response
    ///
    /// 204 yields [`ApiPayload::Null`]; a JSON content type is parsed;
    /// anything else is returned as text.
    pub async fn from_response(response: Response) -> Result<Self, ApiError> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Self::Null);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        if is_json {
            let bytes = response.bytes().await?;
            Ok(Self::Json(serde_json::from_slice(&bytes)?))
        } else {
            Ok(Self::Text(response.text().await?))
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Deserialize into a caller type
    ///
    /// `Null` deserializes from JSON `null`, so `Option<T>` targets accept
    /// it. Text payloads deserialize as a JSON string.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] if the payload does not match `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Self::Null => Value::Null,
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        };
        Ok(serde_json::from_value(value)?)
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Pass a 2xx response through; turn anything else into [`ApiError::Status`]
///
/// The error message is the response body, or the canonical reason phrase
/// when the body is empty or cannot be read.
pub async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!(%status, error = %err, "Failed to read error response body");
            String::new()
        }
    };
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown status").to_string()
    } else {
        body
    };

    Err(ApiError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn unreadable_error_body_falls_back_to_reason_phrase() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            // Promise more body than is sent, then hang up.
            socket
                .write_all(b"HTTP/1.1 502 Bad Gateway\r\nContent-Length: 64\r\n\r\nupstream")
                .await
                .unwrap();
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let response = client.get(format!("http://{addr}/api/orders")).send().await.unwrap();
        let err = ensure_success(response).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.to_string(), "502: Bad Gateway");
    }

    #[test]
    fn null_payload_fits_optional_targets() {
        let value: Option<u32> = ApiPayload::Null.into_typed().unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn mismatched_payload_is_decode_error() {
        let result: Result<Vec<u32>, _> = ApiPayload::Text("<html>".into()).into_typed();
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
