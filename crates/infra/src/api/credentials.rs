//! Credential store selection from configuration

use std::sync::Arc;

use tradeport_common::auth::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use tradeport_domain::{StorageBackend, StorageConfig};
use tracing::debug;

use super::errors::ApiError;

/// Build the credential store named by the storage configuration
///
/// # Errors
/// Returns [`ApiError::Config`] when the file backend has no path, or the
/// keychain backend is requested without the `keychain` feature.
pub fn credential_store(config: &StorageConfig) -> Result<Arc<dyn CredentialStore>, ApiError> {
    debug!(backend = ?config.backend, "Selecting credential store");

    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryCredentialStore::new())),
        StorageBackend::File => {
            let path = config.path.as_ref().ok_or_else(|| {
                ApiError::Config("file credential store requires storage.path".to_string())
            })?;
            Ok(Arc::new(FileCredentialStore::new(path)))
        }
        StorageBackend::Keychain => keychain_store(config),
    }
}

#[cfg(feature = "keychain")]
fn keychain_store(config: &StorageConfig) -> Result<Arc<dyn CredentialStore>, ApiError> {
    use tradeport_common::auth::KeychainCredentialStore;
    use tradeport_domain::constants::DEFAULT_KEYCHAIN_SERVICE;

    let service = config.service.as_deref().unwrap_or(DEFAULT_KEYCHAIN_SERVICE);
    Ok(Arc::new(KeychainCredentialStore::new(service)))
}

#[cfg(not(feature = "keychain"))]
fn keychain_store(_config: &StorageConfig) -> Result<Arc<dyn CredentialStore>, ApiError> {
    Err(ApiError::Config("keychain storage requires the `keychain` feature".to_string()))
}
