//! Platform keychain credential store.
//!
//! The token pair is kept as one JSON secret so that a pair write is a single
//! keychain operation. Keychain calls block, so each one runs on the tokio
//! blocking pool.

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use super::store::StoredCredentials;
use super::traits::CredentialStore;
use super::types::{StoreError, TokenPair};

const ACCOUNT: &str = "tokens";

/// Credential store backed by the OS keychain (macOS Keychain, Windows
/// Credential Manager, Secret Service on Linux)
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service: String,
    account: String,
}

impl KeychainCredentialStore {
    /// Create a store for the given keychain service name
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into(), account: ACCOUNT.to_string() }
    }

    /// Use a non-default account name within the service
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Run a blocking keychain operation against this store's entry
    async fn with_entry<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, StoreError> + Send + 'static,
    {
        let service = self.service.clone();
        let account = self.account.clone();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &account).map_err(keychain_error)?;
            op(entry)
        })
        .await?
    }

    async fn load(&self) -> Result<StoredCredentials, StoreError> {
        self.with_entry(|entry| match entry.get_password() {
            Ok(secret) => Ok(serde_json::from_str(&secret)?),
            Err(keyring::Error::NoEntry) => Ok(StoredCredentials::default()),
            Err(err) => Err(keychain_error(err)),
        })
        .await
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.access_token)
    }

    async fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.refresh_token)
    }

    async fn store_pair(&self, pair: &TokenPair) -> Result<(), StoreError> {
        debug!(service = %self.service, "Storing token pair in keychain");
        let secret = serde_json::to_string(&StoredCredentials::from(pair))?;
        self.with_entry(move |entry| entry.set_password(&secret).map_err(keychain_error)).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        debug!(service = %self.service, "Deleting token pair from keychain");
        self.with_entry(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(keychain_error(err)),
        })
        .await
    }
}

fn keychain_error(err: keyring::Error) -> StoreError {
    StoreError::Keychain(err.to_string())
}
