//! Persistent key-value storage for request identity.
//!
//! The pipeline only relies on the get/set/remove contract of
//! [`IdentityStore`]; the two implementations here cover tests and short
//! lived sessions ([`MemoryIdentityStore`]) and the CLI
//! ([`FileIdentityStore`]).

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};

/// Async string key-value store holding `udid` and `social_id`.
///
/// A missing key is a valid state and reads as `Ok(None)`.
#[async_trait]
pub trait IdentityStore: Debug + Send + Sync {
    /// Value stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Synchronous read used by tests and diagnostics.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// JSON file holding a flat string map.
///
/// Every operation re-reads the file so values written by another process
/// are picked up. Writes go through a sibling temp file and a rename.
#[derive(Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileIdentityStore {
    /// Store backed by the JSON file at `path`. The file is created on
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> StoreResult<BTreeMap<String, String>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupted {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_entries(
        &self,
        entries: &BTreeMap<String, String>,
    ) -> StoreResult<()> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let json = serde_json::to_vec_pretty(entries)
            .map_err(|err| write_err(std::io::Error::other(err)))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp_path, perms)
                .await
                .map_err(write_err)?;
        }

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(write_err)
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}
