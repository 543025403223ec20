//! Marketplace API client
//!
//! HTTP access to the TradePort backend with bearer authentication. Every
//! request goes through [`ApiClient::authorized_fetch`], which attaches the
//! access token to same-origin requests and, on a 401, refreshes the token
//! pair once and reissues the request once.
//!
//! # Architecture
//!
//! - Transport through [`crate::http::HttpClient`] (no direct reqwest client)
//! - Token storage and refresh coordination in `tradeport_common::auth`
//! - Refresh endpoint spoken by [`HttpRefreshClient`]
//! - [`QueryFn`] adapts the client to key-based query caches

pub mod auth;
pub mod client;
pub mod credentials;
pub mod errors;
pub mod origin;
pub mod payload;
pub mod query;
pub mod request;

pub use auth::HttpRefreshClient;
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use credentials::credential_store;
pub use errors::{ApiError, ApiErrorCategory};
pub use origin::AppOrigin;
pub use payload::{ensure_success, ApiPayload};
pub use query::{QueryFn, QueryKey, UnauthorizedBehavior};
pub use request::{Credentials, FetchRequest, FormPayload, FormValue, RequestBody};
