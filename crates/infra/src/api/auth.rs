//! Refresh endpoint client
//!
//! Exchanges a refresh token for a new token pair over HTTP. The request
//! carries cookies but never a bearer header: the access token is the thing
//! being replaced.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use tradeport_common::auth::{RefreshClient, RefreshFailure, RefreshOutcome, RefreshResponse};
use url::Url;

use crate::http::HttpClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// [`RefreshClient`] backed by `POST {base_url}{refresh_path}`
#[derive(Debug, Clone)]
pub struct HttpRefreshClient {
    http: Arc<HttpClient>,
    endpoint: Url,
}

impl HttpRefreshClient {
    pub fn new(http: Arc<HttpClient>, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RefreshClient for HttpRefreshClient {
    async fn refresh(&self, refresh_token: &str) -> RefreshOutcome {
        let builder = self
            .http
            .request(Method::POST, self.endpoint.clone())
            .json(&RefreshRequest { refresh_token });

        let response = match self.http.send(builder, true).await {
            Ok(response) => response,
            Err(e) => return RefreshOutcome::Failure(RefreshFailure::Network(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return RefreshOutcome::Failure(RefreshFailure::Rejected { status: status.as_u16() });
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return RefreshOutcome::Failure(RefreshFailure::Network(e.to_string())),
        };

        serde_json::from_slice::<RefreshResponse>(&bytes)
            .map_err(|e| RefreshFailure::MalformedBody(e.to_string()))
            .and_then(RefreshResponse::into_pair)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tradeport_common::auth::TokenPair;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_for(server: &MockServer) -> HttpRefreshClient {
        let http = HttpClient::builder().timeout(Duration::from_secs(5)).build().unwrap();
        let endpoint = Url::parse(&format!("{}/api/auth/refresh", server.uri())).unwrap();
        HttpRefreshClient::new(Arc::new(http), endpoint)
    }

    #[tokio::test]
    async fn posts_refresh_token_and_returns_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({ "refreshToken": "R1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "new-A",
                "refreshToken": "R2",
                "user": { "id": 3, "role": "buyer" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.refresh("R1").await;
        assert_eq!(outcome, RefreshOutcome::Success(TokenPair::new("new-A", "R2")));
    }

    #[tokio::test]
    async fn never_sends_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "accessToken": "a", "refreshToken": "r" })),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).await.refresh("R1").await.is_success());
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(401)).mount(&server).await;

        let outcome = client_for(&server).await.refresh("expired").await;
        assert_eq!(outcome, RefreshOutcome::Failure(RefreshFailure::Rejected { status: 401 }));
    }

    #[tokio::test]
    async fn incomplete_or_invalid_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "a" })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        for _ in 0..2 {
            let outcome = client.refresh("R1").await;
            assert!(
                matches!(outcome, RefreshOutcome::Failure(RefreshFailure::MalformedBody(_))),
                "unexpected outcome {outcome:?}"
            );
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let http = HttpClient::builder().timeout(Duration::from_secs(5)).build().unwrap();
        let endpoint = Url::parse(&format!("http://{addr}/api/auth/refresh")).unwrap();
        let client = HttpRefreshClient::new(Arc::new(http), endpoint);

        assert!(matches!(
            client.refresh("R1").await,
            RefreshOutcome::Failure(RefreshFailure::Network(_))
        ));
    }
}
