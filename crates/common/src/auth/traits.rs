//! Traits for credential storage and token refresh
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (the refresh endpoint, persistent storage).

use async_trait::async_trait;

use super::types::{RefreshOutcome, StoreError, TokenPair};

/// Persistent home of the token pair
///
/// Implementations must treat [`CredentialStore::store_pair`] as a single
/// write: readers never observe the new access token next to the old refresh
/// token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored access token, if any
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read
    async fn access_token(&self) -> Result<Option<String>, StoreError>;

    /// Stored refresh token, if any
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read
    async fn refresh_token(&self) -> Result<Option<String>, StoreError>;

    /// Replace both tokens
    ///
    /// # Errors
    /// Returns error if the pair cannot be persisted
    async fn store_pair(&self, pair: &TokenPair) -> Result<(), StoreError>;

    /// Remove both tokens (idempotent)
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be modified
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Exchanges a refresh token for a new token pair
///
/// Implementations report every failure mode through
/// [`RefreshOutcome::Failure`] instead of an error so callers cannot forget
/// the fail-closed branch.
#[async_trait]
pub trait RefreshClient: Send + Sync {
    /// Call the refresh endpoint once
    async fn refresh(&self, refresh_token: &str) -> RefreshOutcome;
}
