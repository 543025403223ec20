//! Credential store implementations
//!
//! Both stores persist the same document layout: two string values under the
//! fixed keys `accessToken` and `refreshToken`.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use super::traits::CredentialStore;
use super::types::{StoreError, TokenPair};

/// On-disk / in-memory document holding the two tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredCredentials {
    /// `true` when neither token is present
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl From<&TokenPair> for StoredCredentials {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: Some(pair.access_token.clone()),
            refresh_token: Some(pair.refresh_token.clone()),
        }
    }
}

/// Process-local credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<StoredCredentials>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a token pair
    #[must_use]
    pub fn with_pair(pair: &TokenPair) -> Self {
        Self { credentials: RwLock::new(pair.into()) }
    }

    /// Create a store from raw values, including half-populated states left
    /// behind by other writers
    #[must_use]
    pub fn with_values(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        Self {
            credentials: RwLock::new(StoredCredentials {
                access_token: access_token.map(str::to_string),
                refresh_token: refresh_token.map(str::to_string),
            }),
        }
    }

    /// Copy of the current document
    #[must_use]
    pub fn snapshot(&self) -> StoredCredentials {
        self.credentials.read().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.credentials.read().access_token.clone())
    }

    async fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.credentials.read().refresh_token.clone())
    }

    async fn store_pair(&self, pair: &TokenPair) -> Result<(), StoreError> {
        *self.credentials.write() = pair.into();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.credentials.write() = StoredCredentials::default();
        Ok(())
    }
}

/// JSON file credential store
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a reader sees either the old pair or the new one. A
/// missing file reads as "no tokens". Reads and removal use `tokio::fs`; the
/// staged write runs on the blocking pool.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store backed by `path` (the file need not exist yet)
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// Path of the backing document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed
    pub async fn load(&self) -> Result<StoredCredentials, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(StoredCredentials::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoredCredentials::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn persist(&self, credentials: &StoredCredentials) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;

        let document = serde_json::to_vec(credentials)?;
        let target = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &document)).await??;

        debug!(path = %self.path.display(), "credential document written");
        Ok(())
    }
}

/// Stage `document` next to `target`, sync it, then rename it into place
fn write_atomically(dir: &Path, target: &Path, document: &[u8]) -> Result<(), StoreError> {
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(document)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.access_token)
    }

    async fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.refresh_token)
    }

    async fn store_pair(&self, pair: &TokenPair) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.persist(&pair.into()).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "credential document removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;
    use tradeport_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    use super::*;

    #[tokio::test]
    async fn memory_store_replaces_pair() {
        let store = MemoryCredentialStore::with_pair(&TokenPair::new("old-A", "R1"));

        store.store_pair(&TokenPair::new("new-A", "R2")).await.unwrap();

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("new-A"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn memory_store_clear_is_idempotent() {
        let store = MemoryCredentialStore::with_values(Some("A"), None);

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("tokens.json"));

        assert_eq!(store.access_token().await.unwrap(), None);
        assert_eq!(store.refresh_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_uses_storage_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tokens.json");
        let store = FileCredentialStore::new(&path);

        store.store_pair(&TokenPair::new("A1", "R1")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ ACCESS_TOKEN_KEY: "A1", REFRESH_TOKEN_KEY: "R1" }));
        assert_eq!(store.load().await.unwrap(), StoredCredentials::from(&TokenPair::new("A1", "R1")));
    }

    #[tokio::test]
    async fn file_store_interleaves_readers_with_writers() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileCredentialStore::new(dir.path().join("tokens.json")));

        let writers = (0..8).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store.store_pair(&TokenPair::new(format!("A{i}"), format!("R{i}"))).await
            })
        });
        let readers = (0..8).map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.load().await })
        });

        let writers: Vec<_> = writers.collect();
        for reader in readers.collect::<Vec<_>>() {
            let seen = reader.await.unwrap().unwrap();
            match (seen.access_token, seen.refresh_token) {
                (Some(access), Some(refresh)) => assert_eq!(access[1..], refresh[1..]),
                (None, None) => {}
                torn => panic!("reader observed a torn pair: {torn:?}"),
            }
        }
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let last = store.load().await.unwrap();
        assert_eq!(last.access_token.unwrap()[1..], last.refresh_token.unwrap()[1..]);
    }

    #[tokio::test]
    async fn file_store_clear_removes_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        let store = FileCredentialStore::new(&path);

        store.store_pair(&TokenPair::new("A1", "R1")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(!path.exists());
        assert_eq!(store.access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(matches!(store.access_token().await, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn half_written_document_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, r#"{ "accessToken": "only-access" }"#).unwrap();

        let store = FileCredentialStore::new(&path);
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("only-access"));
        assert_eq!(store.refresh_token().await.unwrap(), None);
    }
}
