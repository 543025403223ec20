//! Authenticated API client
//!
//! Attaches the bearer token to same-origin requests and recovers from an
//! expired access token with one refresh and one reissue.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tradeport_common::auth::{
    bearer_value, CredentialStore, MemoryCredentialStore, RefreshClient, TokenManager, TokenPair,
};
use tradeport_domain::constants::{DEFAULT_REFRESH_PATH, DEFAULT_TIMEOUT_SECONDS};
use tradeport_domain::{ApiConfig, Config};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::auth::HttpRefreshClient;
use super::credentials::credential_store;
use super::errors::ApiError;
use super::origin::AppOrigin;
use super::payload::{ensure_success, ApiPayload};
use super::query::{QueryFn, UnauthorizedBehavior};
use super::request::{Credentials, FetchRequest, RequestBody};
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Application origin; relative targets resolve against it
    pub base_url: String,
    /// Refresh endpoint, relative to `base_url`
    pub refresh_path: String,
    /// Timeout for each request
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            refresh_path: if config.refresh_path.is_empty() {
                DEFAULT_REFRESH_PATH.to_string()
            } else {
                config.refresh_path.clone()
            },
            timeout: Duration::from_secs(if config.timeout_seconds == 0 {
                DEFAULT_TIMEOUT_SECONDS
            } else {
                config.timeout_seconds
            }),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Where a single `authorized_fetch` call is in its lifecycle
///
/// Stages only move forward, which bounds every call to one refresh and one
/// reissue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStage {
    Primary,
    AfterRefresh,
}

/// API client with bearer authentication and refresh-on-401
///
/// Cheap to clone; clones share the HTTP connection pool, the cookie jar and
/// the token manager.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Arc<HttpClient>,
    origin: AppOrigin,
    tokens: Arc<TokenManager>,
}

impl ApiClient {
    /// Create a client that refreshes tokens over HTTP
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the base URL or refresh path is
    /// invalid or the HTTP client cannot be built.
    pub fn new(config: ApiClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        Self::builder().config(config).store(store).build()
    }

    /// Create a client with an explicit refresh client
    pub fn with_refresher(
        config: ApiClientConfig,
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn RefreshClient>,
    ) -> Result<Self, ApiError> {
        Self::builder().config(config).store(store).refresher(refresher).build()
    }

    /// Wire a client from application configuration
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] for an invalid base URL or an unusable
    /// storage backend.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let store = credential_store(&config.storage)?;
        Self::new(ApiClientConfig::from(&config.api), store)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn origin(&self) -> &AppOrigin {
        &self.origin
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    /// Store the pair issued by a login response
    pub async fn login(&self, pair: &TokenPair) -> Result<(), ApiError> {
        self.tokens.store_tokens(pair).await?;
        info!("Session tokens stored");
        Ok(())
    }

    /// Drop both tokens
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.tokens.clear_tokens().await?;
        info!("Session tokens cleared");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated().await
    }

    /// Exchange the stored refresh token for a new pair
    ///
    /// Fail-closed: on any failure both tokens are cleared and `false` is
    /// returned.
    pub async fn refresh_access_token(&self) -> bool {
        self.tokens.refresh_access_token().await
    }

    /// Send a request with bearer authentication
    ///
    /// Same-origin requests get `Authorization: Bearer <token>` unless the
    /// caller set an `Authorization` header. With `retry` set, a 401 triggers
    /// one refresh; on success the request is rebuilt with the new token and
    /// sent once more, and that response is returned whatever its status. If
    /// the refresh fails the original 401 is returned.
    ///
    /// # Errors
    /// Only transport failures and unresolvable targets are errors; every
    /// HTTP status comes back as a response.
    #[instrument(skip(self, request), fields(method = %request.method(), target = %request.target()))]
    pub async fn authorized_fetch(
        &self,
        request: &FetchRequest,
        retry: bool,
    ) -> Result<Response, ApiError> {
        let url = self.origin.resolve(request.target())?;
        let same_origin = self.origin.is_same_origin(&url);
        let mut stage = FetchStage::Primary;

        loop {
            let token = self.tokens.access_token().await;
            let response = self.send_once(request, &url, same_origin, token.as_deref()).await?;

            if stage == FetchStage::AfterRefresh
                || !retry
                || response.status() != StatusCode::UNAUTHORIZED
            {
                return Ok(response);
            }

            debug!("Received 401, attempting token refresh");
            if !self.tokens.refresh_after(token.as_deref()).await {
                warn!("Token refresh failed, returning original 401");
                return Ok(response);
            }

            stage = FetchStage::AfterRefresh;
        }
    }

    async fn send_once(
        &self,
        request: &FetchRequest,
        url: &Url,
        same_origin: bool,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut headers = request.headers().clone();

        if same_origin && !headers.contains_key(AUTHORIZATION) {
            if let Some(token) = token {
                headers.insert(AUTHORIZATION, bearer_header(token)?);
            }
        }

        let mut builder = self.http.request(request.method().clone(), url.clone()).headers(headers);

        builder = match request.request_body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(form.to_form()?),
        };

        let with_cookies = match request.credentials_mode() {
            Credentials::Include => true,
            Credentials::SameOrigin => same_origin,
            Credentials::Omit => false,
        };

        self.http.send(builder, with_cookies).await
    }

    /// Send a request and decode the response
    ///
    /// JSON bodies go out with `Content-Type: application/json`; multipart
    /// bodies carry their own boundary content type.
    ///
    /// # Errors
    /// Non-2xx responses become [`ApiError::Status`] with the response text
    /// (or the reason phrase when empty) as the message.
    #[instrument(skip(self, body))]
    pub async fn api_request(
        &self,
        method: Method,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> Result<ApiPayload, ApiError> {
        let request = FetchRequest::new(method, url).body(body);
        let response = ensure_success(self.authorized_fetch(&request, true).await?).await?;
        ApiPayload::from_response(response).await
    }

    /// Execute a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.api_request(Method::GET, path, RequestBody::Empty).await?.into_typed()
    }

    /// Execute a POST request with a JSON body
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.api_request(Method::POST, path, RequestBody::json(body)?).await?.into_typed()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.api_request(Method::PUT, path, RequestBody::json(body)?).await?.into_typed()
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.api_request(Method::PATCH, path, RequestBody::json(body)?).await?.into_typed()
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.api_request(Method::DELETE, path, RequestBody::Empty).await?.into_typed()
    }

    /// Build a key-based fetcher for a query cache
    pub fn query_fn(&self, on_unauthorized: UnauthorizedBehavior) -> QueryFn {
        QueryFn::new(self.clone(), on_unauthorized)
    }
}

fn bearer_header(token: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&bearer_value(token))
        .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    refresher: Option<Arc<dyn RefreshClient>>,
    http: Option<HttpClient>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store (defaults to in-memory)
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the refresh client (defaults to HTTP against the refresh path)
    pub fn refresher(mut self, refresher: Arc<dyn RefreshClient>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Use a preconfigured HTTP client instead of building one from the
    /// timeout and user agent
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the base URL or refresh path is invalid or the HTTP
    /// client cannot be created
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let origin = AppOrigin::parse(&config.base_url)?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = HttpClient::builder().timeout(config.timeout);
                if let Some(agent) = &config.user_agent {
                    builder = builder.user_agent(agent.clone());
                }
                builder.build()?
            }
        };
        let http = Arc::new(http);

        let refresher = match self.refresher {
            Some(refresher) => refresher,
            None => {
                let endpoint = origin.resolve(&config.refresh_path).map_err(|e| {
                    ApiError::Config(format!("invalid refresh path {:?}: {e}", config.refresh_path))
                })?;
                Arc::new(HttpRefreshClient::new(http.clone(), endpoint)) as Arc<dyn RefreshClient>
            }
        };

        let store =
            self.store.unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()) as Arc<dyn CredentialStore>);

        debug!(base_url = %origin.base(), "API client configured");

        Ok(ApiClient { http, origin, tokens: Arc::new(TokenManager::new(store, refresher)) })
    }
}
