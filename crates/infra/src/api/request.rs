//! Request descriptors
//!
//! A [`FetchRequest`] is a cloneable description of one request. The API
//! client turns it into a `reqwest` request on every attempt, which is what
//! allows the single reissue after a token refresh, multipart bodies
//! included.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::errors::ApiError;

/// Whether cookies accompany a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Send cookies to every origin
    #[default]
    Include,
    /// Send cookies only to the application origin
    SameOrigin,
    /// Never send cookies
    Omit,
}

/// One field of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File { file_name: String, bytes: Vec<u8>, mime: Option<String> },
}

/// Multipart form payload (file uploads, RFQ attachments)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    parts: Vec<(String, FormValue)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormValue::Text(value.into())));
        self
    }

    /// Add a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormValue::File {
                file_name: file_name.into(),
                bytes: bytes.into(),
                mime: mime.map(str::to_string),
            },
        ));
        self
    }

    pub fn parts(&self) -> &[(String, FormValue)] {
        &self.parts
    }

    pub(crate) fn to_form(&self) -> Result<Form, ApiError> {
        self.parts.iter().try_fold(Form::new(), |form, (name, value)| {
            let part = match value {
                FormValue::Text(text) => Part::text(text.clone()),
                FormValue::File { file_name, bytes, mime } => {
                    let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                    match mime {
                        Some(mime) => part.mime_str(mime).map_err(|e| {
                            ApiError::InvalidRequest(format!("invalid MIME type {mime:?}: {e}"))
                        })?,
                        None => part,
                    }
                }
            };
            Ok(form.part(name.clone(), part))
        })
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized as JSON with `Content-Type: application/json`
    Json(Value),
    /// Sent as `multipart/form-data`; no JSON content type is set
    Multipart(FormPayload),
}

impl RequestBody {
    /// Serialize any value into a JSON body
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] if the value cannot be represented
    /// as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<()> for RequestBody {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<FormPayload> for RequestBody {
    fn from(form: FormPayload) -> Self {
        Self::Multipart(form)
    }
}

/// Description of one request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    target: String,
    headers: HeaderMap,
    body: RequestBody,
    credentials: Credentials,
}

impl FetchRequest {
    /// New request for an absolute URL or a path relative to the base URL
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            credentials: Credentials::default(),
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Set a header; a caller-supplied `Authorization` header is never
    /// replaced by the bearer token
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn request_body(&self) -> &RequestBody {
        &self.body
    }

    pub fn credentials_mode(&self) -> Credentials {
        self.credentials
    }
}
