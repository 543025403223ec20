//! Bearer token lifecycle for the marketplace API
//!
//! The API authenticates with a short-lived access token and a longer-lived
//! refresh token. Both are issued together by the login and refresh
//! endpoints and are always written together.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  single-flight refresh, login/logout
//! └────────┬────────┘
//!          │
//!          ├──► RefreshClient     (exchanges a refresh token; HTTP in infra)
//!          │
//!          └──► CredentialStore   (memory / file / keychain)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use tradeport_common::auth::{
//!     MemoryCredentialStore, RefreshClient, RefreshFailure, RefreshOutcome, TokenManager,
//!     TokenPair,
//! };
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl RefreshClient for Offline {
//!     async fn refresh(&self, _refresh_token: &str) -> RefreshOutcome {
//!         RefreshOutcome::Failure(RefreshFailure::Network("offline".into()))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryCredentialStore::new());
//! let manager = TokenManager::new(store, Arc::new(Offline));
//!
//! manager.store_tokens(&TokenPair::new("access", "refresh")).await?;
//! assert!(manager.is_authenticated().await);
//!
//! // A failed refresh is fail-closed: both tokens are dropped.
//! assert!(!manager.refresh_access_token().await);
//! assert!(!manager.is_authenticated().await);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: `TokenPair`, refresh endpoint contract, outcome types
//! - **[`traits`]**: `CredentialStore` and `RefreshClient` seams
//! - **[`store`]**: in-memory and file-backed stores
//! - **[`token_manager`]**: refresh coordination and session helpers

#[cfg(feature = "keychain")]
mod keychain;
pub mod store;
pub mod token_manager;
pub mod traits;
pub mod types;

#[cfg(feature = "keychain")]
pub use keychain::KeychainCredentialStore;
pub use store::{FileCredentialStore, MemoryCredentialStore, StoredCredentials};
pub use token_manager::{TokenManager, TokenManagerError};
pub use traits::{CredentialStore, RefreshClient};
pub use types::{
    bearer_value, RefreshFailure, RefreshOutcome, RefreshResponse, StoreError, TokenPair,
};
