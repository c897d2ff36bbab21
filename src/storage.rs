use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Keys of the per-profile key space.
pub mod keys {
    pub const SESSION_USER: &str = "mediyo_user";
    pub const ASSISTANT_MESSAGES: &str = "assistant_messages";
    pub const ASSISTANT_PREFERENCES: &str = "assistant_preferences";
    pub const ASSISTANT_LAST_SAVE: &str = "assistant_last_save";
    pub const ASSISTANT_CONVERSATION_COUNT: &str = "assistant_conversation_count";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded writing {key} ({size} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    /// Banner text shown when a write could not be persisted.
    pub fn warning(&self) -> String {
        format!("Failed to save data locally: {self}")
    }
}

/// Profile-scoped key-value store. One profile is one isolated key space.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get_raw(&self, profile: Uuid, key: &str) -> Result<Option<String>, StorageError>;
    async fn put_raw(&self, profile: Uuid, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove(&self, profile: Uuid, key: &str) -> Result<(), StorageError>;
}

fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Read and deserialize a value. Missing, unreadable and malformed entries
/// all come back as `None`.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    profile: Uuid,
    key: &str,
) -> Option<T> {
    let raw = match store.get_raw(profile, key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, %profile, key, "storage read failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, %profile, key, "discarding malformed stored value");
            None
        }
    }
}

pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    profile: Uuid,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.put_raw(profile, key, raw).await
}

/// One JSON file per key under `<root>/<profile>/`.
pub struct FileKvStore {
    root: PathBuf,
    quota_bytes: usize,
}

impl FileKvStore {
    pub fn new(root: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            root: root.into(),
            quota_bytes,
        }
    }

    fn path_for(&self, profile: Uuid, key: &str) -> PathBuf {
        self.root.join(profile.to_string()).join(format!("{key}.json"))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get_raw(&self, profile: Uuid, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        match tokio::fs::read_to_string(self.path_for(profile, key)).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }

    async fn put_raw(&self, profile: Uuid, key: &str, value: String) -> Result<(), StorageError> {
        check_key(key)?;
        if value.len() > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                limit: self.quota_bytes,
            });
        }
        let path = self.path_for(profile, key);
        let unavailable = |e: std::io::Error| StorageError::Unavailable(e.to_string());
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(unavailable)?;
        }
        // tmp + rename so a reader never sees a half-written value
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value.as_bytes())
            .await
            .map_err(unavailable)?;
        tokio::fs::rename(&tmp, &path).await.map_err(unavailable)?;
        debug!(%profile, key, bytes = value.len(), "stored value");
        Ok(())
    }

    async fn remove(&self, profile: Uuid, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        match tokio::fs::remove_file(self.path_for(profile, key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }
}

/// In-process store. `quota_bytes` and `disabled` reproduce the two write
/// failures a browser profile can hit.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<(Uuid, String), String>>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(Uuid, String), String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get_raw(&self, profile: Uuid, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".into()));
        }
        Ok(self.lock()?.get(&(profile, key.to_string())).cloned())
    }

    async fn put_raw(&self, profile: Uuid, key: &str, value: String) -> Result<(), StorageError> {
        check_key(key)?;
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".into()));
        }
        if let Some(limit) = self.quota_bytes {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }
        self.lock()?.insert((profile, key.to_string()), value);
        Ok(())
    }

    async fn remove(&self, profile: Uuid, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".into()));
        }
        self.lock()?.remove(&(profile, key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn file_store_roundtrip_and_remove() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKvStore::new(dir.path(), 1024);
        let profile = Uuid::new_v4();
        let value = Sample {
            name: "a".into(),
            count: 3,
        };

        save_json(&store, profile, "sample", &value).await.expect("save");
        let back: Option<Sample> = load_json(&store, profile, "sample").await;
        assert_eq!(back, Some(value));

        store.remove(profile, "sample").await.expect("remove");
        let gone: Option<Sample> = load_json(&store, profile, "sample").await;
        assert!(gone.is_none());
        // removing twice is not an error
        store.remove(profile, "sample").await.expect("remove again");
    }

    #[tokio::test]
    async fn profiles_do_not_see_each_other() {
        let store = MemoryKvStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.put_raw(a, "k", "1".into()).await.unwrap();
        assert_eq!(store.get_raw(b, "k").await.unwrap(), None);
        assert_eq!(store.get_raw(a, "k").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn malformed_value_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKvStore::new(dir.path(), 1024);
        let profile = Uuid::new_v4();
        store
            .put_raw(profile, "sample", "{not json".into())
            .await
            .unwrap();
        let back: Option<Sample> = load_json(&store, profile, "sample").await;
        assert!(back.is_none());
    }

    #[tokio::test]
    async fn quota_is_enforced_on_both_stores() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = FileKvStore::new(dir.path(), 4);
        let mem = MemoryKvStore::with_quota(4);
        let profile = Uuid::new_v4();

        for store in [&file as &dyn KvStore, &mem as &dyn KvStore] {
            let err = store
                .put_raw(profile, "big", "12345".into())
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::QuotaExceeded { size: 5, limit: 4, .. }));
            assert!(err.warning().starts_with("Failed to save data locally"));
        }
    }

    #[tokio::test]
    async fn disabled_store_reads_as_absent() {
        let store = MemoryKvStore::disabled();
        let profile = Uuid::new_v4();
        assert!(matches!(
            save_json(&store, profile, "k", &1u8).await,
            Err(StorageError::Unavailable(_))
        ));
        let v: Option<u8> = load_json(&store, profile, "k").await;
        assert!(v.is_none());
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKvStore::new(dir.path(), 1024);
        let err = store
            .put_raw(Uuid::new_v4(), "../escape", "x".into())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
