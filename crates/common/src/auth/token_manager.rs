//! Token manager with single-flight refresh
//!
//! Owns the credential store and the refresh client:
//! - Token retrieval for request signing
//! - Fail-closed refresh (any failure clears both tokens)
//! - Serialized refreshes so concurrent 401s share one exchange
//! - Login/logout helpers

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::traits::{CredentialStore, RefreshClient};
use super::types::{RefreshFailure, RefreshOutcome, StoreError, TokenPair};

/// Error type for token manager operations
#[derive(Debug, Error)]
pub enum TokenManagerError {
    /// Credential store operation failed
    #[error("Credential store error: {0}")]
    Storage(#[from] StoreError),
}

impl From<TokenManagerError> for tradeport_domain::TradePortError {
    fn from(err: TokenManagerError) -> Self {
        match err {
            TokenManagerError::Storage(inner) => inner.into(),
        }
    }
}

/// Token manager shared by every request issued through one API client
///
/// Refreshes are serialized by an async mutex. A caller that queued behind a
/// refresh already in progress compares the stored access token with the one
/// its failed request was built with; if they differ the pair was replaced
/// while it waited and no second exchange is made.
pub struct TokenManager {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn RefreshClient>,
    refresh_gate: Mutex<()>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `store` - Where the token pair lives
    /// * `refresher` - Client for the refresh endpoint
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn RefreshClient>) -> Self {
        Self { store, refresher, refresh_gate: Mutex::new(()) }
    }

    /// Current access token
    ///
    /// Storage read failures are logged and reported as "no token" so a
    /// broken store degrades to unauthenticated requests.
    pub async fn access_token(&self) -> Option<String> {
        match self.store.access_token().await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read access token");
                None
            }
        }
    }

    /// Check if an access token is stored
    pub async fn is_authenticated(&self) -> bool {
        self.access_token().await.is_some()
    }

    /// Store a freshly issued pair (after login)
    ///
    /// # Errors
    /// Returns error if the store rejects the write
    pub async fn store_tokens(&self, pair: &TokenPair) -> Result<(), TokenManagerError> {
        self.store.store_pair(pair).await?;
        info!("Tokens stored");
        Ok(())
    }

    /// Clear both tokens (logout)
    ///
    /// # Errors
    /// Returns error if the store cannot be cleared
    pub async fn clear_tokens(&self) -> Result<(), TokenManagerError> {
        self.store.clear().await?;
        info!("Tokens cleared (logged out)");
        Ok(())
    }

    /// Exchange the stored refresh token for a new pair
    ///
    /// Returns `false` without any network call when no refresh token is
    /// stored. On every failure both tokens are cleared.
    pub async fn refresh_access_token(&self) -> bool {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await.is_success()
    }

    /// Refresh on behalf of a request that was rejected with 401
    ///
    /// `stale_access_token` is the access token that was stored when the
    /// rejected request was built. If a concurrent refresh replaced it while
    /// this caller waited, the new token is reused and `true` is returned
    /// without another exchange.
    pub async fn refresh_after(&self, stale_access_token: Option<&str>) -> bool {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.access_token().await {
            if stale_access_token != Some(current.as_str()) {
                debug!("Access token already replaced by a concurrent refresh");
                return true;
            }
        }

        self.refresh_locked().await.is_success()
    }

    async fn refresh_locked(&self) -> RefreshOutcome {
        let refresh_token = match self.store.refresh_token().await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return self.fail_closed(RefreshFailure::NoRefreshToken).await,
            Err(e) => return self.fail_closed(RefreshFailure::Storage(e.to_string())).await,
        };

        match self.refresher.refresh(&refresh_token).await {
            RefreshOutcome::Success(pair) => match self.store.store_pair(&pair).await {
                Ok(()) => {
                    info!("Successfully refreshed access token");
                    RefreshOutcome::Success(pair)
                }
                Err(e) => self.fail_closed(RefreshFailure::Storage(e.to_string())).await,
            },
            RefreshOutcome::Failure(reason) => self.fail_closed(reason).await,
        }
    }

    async fn fail_closed(&self, reason: RefreshFailure) -> RefreshOutcome {
        match reason {
            RefreshFailure::NoRefreshToken => debug!("Refresh skipped: {reason}"),
            _ => warn!(reason = %reason, "Token refresh failed, clearing credentials"),
        }

        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear credentials after refresh failure");
        }

        RefreshOutcome::Failure(reason)
    }
}
