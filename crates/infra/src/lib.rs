//! # TradePort Infrastructure
//!
//! Infrastructure for the TradePort marketplace client.
//!
//! This crate contains:
//! - HTTP transport with cookie handling
//! - The authenticated API client (bearer attach, refresh-on-401)
//! - Configuration loading from environment and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Token storage and refresh coordination come from `tradeport-common`
//! - Depends on `tradeport-domain` for configuration and error types
//! - Contains all "impure" code (network and file I/O)

pub mod api;
pub mod config;
pub mod http;
pub mod observability;

mod errors;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientConfig, ApiError, ApiPayload, Credentials, FetchRequest, FormPayload,
    QueryFn, QueryKey, RequestBody, UnauthorizedBehavior,
};
pub use http::{HttpClient, HttpClientBuilder};
