//! Key-based fetcher for query caches
//!
//! A [`QueryFn`] answers "give me the data for this key" the way a
//! query-cache layer expects: the key segments form the request path and a
//! 401 is either "no data" or an error depending on the view.

use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::errors::ApiError;
use super::payload::{ensure_success, ApiPayload};
use super::request::FetchRequest;

/// Query key; segments are joined with `/` to form the request path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn path(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl<S: Into<String>> FromIterator<S> for QueryKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<&str> for QueryKey {
    fn from(path: &str) -> Self {
        Self(vec![path.to_string()])
    }
}

/// What a query does with a 401 that survived the refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedBehavior {
    /// Resolve to [`ApiPayload::Null`] (optional-auth views)
    ReturnNull,
    /// Fail with [`ApiError::Status`] (protected views)
    Throw,
}

/// Fetcher produced by [`ApiClient::query_fn`]
#[derive(Debug, Clone)]
pub struct QueryFn {
    client: ApiClient,
    on_unauthorized: UnauthorizedBehavior,
}

impl QueryFn {
    pub(crate) fn new(client: ApiClient, on_unauthorized: UnauthorizedBehavior) -> Self {
        Self { client, on_unauthorized }
    }

    pub fn on_unauthorized(&self) -> UnauthorizedBehavior {
        self.on_unauthorized
    }

    /// Fetch the data for `key`
    ///
    /// # Errors
    /// Non-2xx responses (and 401 under [`UnauthorizedBehavior::Throw`])
    /// become [`ApiError::Status`]; transport failures pass through.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn fetch(&self, key: &QueryKey) -> Result<ApiPayload, ApiError> {
        let response = self.client.authorized_fetch(&FetchRequest::get(key.path()), true).await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && self.on_unauthorized == UnauthorizedBehavior::ReturnNull
        {
            debug!("Query unauthorized, resolving to null");
            return Ok(ApiPayload::Null);
        }

        ApiPayload::from_response(ensure_success(response).await?).await
    }

    /// Fetch and deserialize; use `Option<T>` with
    /// [`UnauthorizedBehavior::ReturnNull`]
    pub async fn fetch_as<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<T, ApiError> {
        self.fetch(key).await?.into_typed()
    }
}
