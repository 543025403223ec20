use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::api::errors::ApiError;

/// HTTP client with a shared cookie jar and timeout support.
///
/// Each call to [`HttpClient::send`] issues exactly one request; the caller
/// decides whether cookies travel with it.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    cookies: Arc<Jar>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Cookie jar shared by every request sent with cookies enabled.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookies
    }

    /// Execute the provided request builder once.
    ///
    /// With `with_cookies` set, cookies held for the target URL are attached
    /// (unless the caller set a `Cookie` header) and any `Set-Cookie` headers
    /// on the response are stored back into the jar.
    pub async fn send(&self, builder: RequestBuilder, with_cookies: bool) -> Result<Response, ApiError> {
        let mut request = builder.build()?;

        let method = request.method().clone();
        let url = request.url().clone();

        if with_cookies && !request.headers().contains_key(COOKIE) {
            if let Some(cookie) = self.cookies.cookies(&url) {
                request.headers_mut().insert(COOKIE, cookie);
            }
        }

        debug!(%method, %url, with_cookies, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");

                if with_cookies {
                    let mut set_cookies = response.headers().get_all(SET_COOKIE).iter();
                    self.cookies.set_cookies(&mut set_cookies, &url);
                }

                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(err.into())
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    cookies: Option<Arc<Jar>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None, cookies: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Share an existing cookie jar instead of starting empty.
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookies = Some(jar);
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, cookies: self.cookies.unwrap_or_default() })
    }
}
