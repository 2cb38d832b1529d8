//! Object storage abstraction for uploaded page images

use crate::error::StorageError;
use crate::types::OwnerId;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Root prefix for per-owner scopes
const OWNERS_PREFIX: &str = "users";

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Abstract object store: bytes in by key, fetchable URL out
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read data from the given key
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Write data to the given key, replacing any previous object
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete the object at the given key
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Resolve the publicly fetchable URL for a stored key
    async fn public_url(&self, key: &str) -> StorageResult<String>;
}

/// Normalize a key into `/`-separated components, rejecting any that escape the root
fn normalize_key(key: &str) -> StorageResult<String> {
    let mut parts = Vec::new();
    for component in Path::new(key).components() {
        match component {
            Component::Normal(c) => parts.push(
                c.to_str()
                    .ok_or_else(|| StorageError::BackendError("Key is not valid UTF-8".into()))?,
            ),
            Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                return Err(StorageError::PermissionDenied(format!(
                    "Path traversal attempt detected: {key}"
                )));
            }
        }
    }
    if parts.is_empty() {
        return Err(StorageError::BackendError("Empty storage key".into()));
    }
    Ok(parts.join("/"))
}

/// Local filesystem storage provider
///
/// Objects live under `root`; URLs are formed by appending the key to
/// `base_url`, which is expected to serve `root` (the server mounts it at
/// `/files`).
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory and public base URL
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Root directory objects are written under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, key: &str) -> StorageResult<PathBuf> {
        Ok(self.root.join(normalize_key(key)?))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.full_path(key)?;
        tokio::fs::read(full_path)
            .await
            .map_err(|e| StorageError::NotFound(e.to_string()))
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let full_path = self.full_path(key)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?;
        }
        tokio::fs::write(full_path, data)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let full_path = self.full_path(key)?;
        tokio::fs::try_exists(full_path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let full_path = self.full_path(key)?;
        tokio::fs::remove_file(full_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
                _ => StorageError::BackendError(e.to_string()),
            })
    }

    async fn public_url(&self, key: &str) -> StorageResult<String> {
        let key = normalize_key(key)?;
        if !self.exists(&key).await? {
            return Err(StorageError::NotFound(key));
        }
        Ok(format!("{}/{}", self.base_url, key))
    }
}

/// In-memory storage provider (for testing)
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let key = normalize_key(key)?;
        self.data
            .read()
            .get(&key)
            .cloned()
            .ok_or(StorageError::NotFound(key))
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let key = normalize_key(key)?;
        self.data.write().insert(key, data);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let key = normalize_key(key)?;
        Ok(self.data.read().contains_key(&key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let key = normalize_key(key)?;
        match self.data.write().remove(&key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key)),
        }
    }

    async fn public_url(&self, key: &str) -> StorageResult<String> {
        let key = normalize_key(key)?;
        if !self.data.read().contains_key(&key) {
            return Err(StorageError::NotFound(key));
        }
        Ok(format!("memory://{key}"))
    }
}

/// A view of another provider confined to the keys under `prefix`
///
/// Every key is resolved as `{prefix}/{key}`, so two scopes over the same
/// backend never see each other's objects.
#[derive(Clone)]
pub struct ScopedStorage {
    inner: Arc<dyn StorageProvider>,
    prefix: String,
}

impl ScopedStorage {
    /// Fails if `prefix` is empty or escapes the backend root
    pub fn new(inner: Arc<dyn StorageProvider>, prefix: &str) -> StorageResult<Self> {
        Ok(Self {
            inner,
            prefix: normalize_key(prefix)?,
        })
    }

    /// Scope confined to one owner's objects, under `users/{owner}`
    ///
    /// Bytes outside `[A-Za-z0-9_-]` are written as `~xx`, so distinct owner
    /// ids always map to distinct single path segments.
    pub fn for_owner(inner: Arc<dyn StorageProvider>, owner: &OwnerId) -> Self {
        let mut segment = String::with_capacity(owner.as_str().len());
        for byte in owner.as_str().bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => segment.push(byte as char),
                _ => segment.push_str(&format!("~{byte:02x}")),
            }
        }
        if segment.is_empty() {
            segment.push('~');
        }
        Self {
            inner,
            prefix: format!("{OWNERS_PREFIX}/{segment}"),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn scoped(&self, key: &str) -> StorageResult<String> {
        Ok(format!("{}/{}", self.prefix, normalize_key(key)?))
    }
}

#[async_trait]
impl StorageProvider for ScopedStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(&self.scoped(key)?).await
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.inner.write(&self.scoped(key)?, data).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(&self.scoped(key)?).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(&self.scoped(key)?).await
    }

    async fn public_url(&self, key: &str) -> StorageResult<String> {
        self.inner.public_url(&self.scoped(key)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();

        storage.write("books/a/page1.jpg", b"hello".to_vec()).await.unwrap();

        let data = storage.read("books/a/page1.jpg").await.unwrap();
        assert_eq!(data, b"hello");

        assert!(storage.exists("books/a/page1.jpg").await.unwrap());
        assert!(!storage.exists("missing.txt").await.unwrap());

        assert_eq!(
            storage.public_url("books/a/page1.jpg").await.unwrap(),
            "memory://books/a/page1.jpg"
        );
        assert!(storage.public_url("missing.txt").await.is_err());

        storage.delete("books/a/page1.jpg").await.unwrap();
        assert!(storage.is_empty());
        assert!(matches!(
            storage.delete("books/a/page1.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_storage_urls() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/files/");

        storage
            .write("books/trip/page1.png", vec![1, 2, 3])
            .await
            .unwrap();

        assert!(dir.path().join("books/trip/page1.png").exists());
        assert_eq!(
            storage.public_url("books/trip/page1.png").await.unwrap(),
            "http://localhost:3000/files/books/trip/page1.png"
        );
        assert_eq!(storage.read("books/trip/page1.png").await.unwrap(), vec![1, 2, 3]);

        storage.delete("books/trip/page1.png").await.unwrap();
        assert!(!storage.exists("books/trip/page1.png").await.unwrap());
        assert!(storage.public_url("books/trip/page1.png").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_storage_normalizes_every_key() {
        let storage = MemoryStorage::new();
        storage.write("./books/a/page1.jpg", b"x".to_vec()).await.unwrap();

        assert!(storage.exists("./books/a/page1.jpg").await.unwrap());
        assert_eq!(storage.read("books/./a/page1.jpg").await.unwrap(), b"x");
        assert_eq!(
            storage.public_url("./books/a/page1.jpg").await.unwrap(),
            "memory://books/a/page1.jpg"
        );
        assert!(matches!(
            storage.read("../books/a/page1.jpg").await,
            Err(StorageError::PermissionDenied(_))
        ));
        storage.delete("./books/a/page1.jpg").await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_scoped_storage_isolates_prefixes() {
        let backend = Arc::new(MemoryStorage::new());
        let alice = ScopedStorage::new(backend.clone(), "users/alice").unwrap();
        let bob = ScopedStorage::new(backend.clone(), "users/bob").unwrap();

        alice.write("books/trip/page1.png", b"alice".to_vec()).await.unwrap();
        bob.write("books/trip/page1.png", b"bob".to_vec()).await.unwrap();

        assert_eq!(alice.read("books/trip/page1.png").await.unwrap(), b"alice");
        assert_eq!(bob.read("books/trip/page1.png").await.unwrap(), b"bob");
        assert_eq!(
            alice.public_url("books/trip/page1.png").await.unwrap(),
            "memory://users/alice/books/trip/page1.png"
        );
        assert_eq!(
            backend.keys(),
            vec![
                "users/alice/books/trip/page1.png".to_string(),
                "users/bob/books/trip/page1.png".to_string(),
            ]
        );

        // Keys cannot climb out of the scope
        assert!(matches!(
            alice.read("../bob/books/trip/page1.png").await,
            Err(StorageError::PermissionDenied(_))
        ));
        assert!(ScopedStorage::new(backend, "../escape").is_err());
    }

    #[test]
    fn test_owner_scopes_are_single_distinct_segments() {
        let backend: Arc<dyn StorageProvider> = Arc::new(MemoryStorage::new());
        let prefix = |id: &str| {
            ScopedStorage::for_owner(backend.clone(), &OwnerId::new(id))
                .prefix()
                .to_string()
        };

        assert_eq!(prefix("user_a"), "users/user_a");
        assert_eq!(prefix("../b"), "users/~2e~2e~2fb");
        assert_eq!(prefix("a.b"), "users/a~2eb");
        assert_ne!(prefix("a.b"), prefix("a_b"));
        assert_eq!(prefix(""), "users/~");
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost");

        let err = storage.write("../escape.jpg", vec![0]).await.unwrap_err();
        assert!(matches!(err, StorageError::PermissionDenied(_)));
    }
}
