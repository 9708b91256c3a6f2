//! Object store interface and the in-memory backend.

use crate::error::ArchiveResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Per-object metadata sent along with an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// MIME type of the body.
    pub content_type: Option<String>,
    /// Backend storage class, e.g. `GLACIER_IR`.
    pub storage_class: Option<String>,
}

/// Durable key/value blob storage (S3, GCS, Azure Blob, ...).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any previous object.
    async fn put(&self, key: &str, data: Vec<u8>, options: PutOptions) -> ArchiveResult<()>;
    /// Fetch the object under `key`, `None` if absent.
    async fn get(&self, key: &str) -> ArchiveResult<Option<Vec<u8>>>;
    /// Whether an object exists under `key`.
    async fn exists(&self, key: &str) -> ArchiveResult<bool>;
    /// Keys starting with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> ArchiveResult<Vec<String>>;
    /// Remove the object under `key`; absent keys are not an error.
    async fn delete(&self, key: &str) -> ArchiveResult<()>;
}

/// Operation counters of a [`MemoryObjectStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryObjectStoreStats {
    /// Number of put operations.
    pub puts: u64,
    /// Number of get operations.
    pub gets: u64,
    /// Number of delete operations.
    pub deletes: u64,
    /// Number of exists checks.
    pub exists_checks: u64,
    /// Number of list operations.
    pub list_calls: u64,
    /// Total bytes currently stored.
    pub total_bytes_stored: u64,
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    options: PutOptions,
}

/// In-process object store keeping every object in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    stats: Mutex<MemoryObjectStoreStats>,
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation counters so far.
    pub fn stats(&self) -> MemoryObjectStoreStats {
        locked(&self.stats).clone()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        locked(&self.objects).len()
    }

    /// Upload options recorded for `key`.
    pub fn options_of(&self, key: &str) -> Option<PutOptions> {
        locked(&self.objects).get(key).map(|o| o.options.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Vec<u8>, options: PutOptions) -> ArchiveResult<()> {
        let bytes = data.len() as u64;
        let replaced = locked(&self.objects).insert(key.to_string(), StoredObject { data, options });
        let replaced_bytes = replaced.map_or(0, |o| o.data.len() as u64);

        let mut stats = locked(&self.stats);
        stats.puts += 1;
        stats.total_bytes_stored = stats
            .total_bytes_stored
            .saturating_sub(replaced_bytes)
            .saturating_add(bytes);
        debug!(key, bytes, "memory put");
        Ok(())
    }

    async fn get(&self, key: &str) -> ArchiveResult<Option<Vec<u8>>> {
        let data = locked(&self.objects).get(key).map(|o| o.data.clone());
        locked(&self.stats).gets += 1;
        debug!(key, found = data.is_some(), "memory get");
        Ok(data)
    }

    async fn exists(&self, key: &str) -> ArchiveResult<bool> {
        let exists = locked(&self.objects).contains_key(key);
        locked(&self.stats).exists_checks += 1;
        Ok(exists)
    }

    async fn list(&self, prefix: &str) -> ArchiveResult<Vec<String>> {
        let keys: Vec<String> = locked(&self.objects)
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();
        locked(&self.stats).list_calls += 1;
        debug!(prefix, count = keys.len(), "memory list");
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> ArchiveResult<()> {
        let removed = locked(&self.objects).remove(key);
        let mut stats = locked(&self.stats);
        stats.deletes += 1;
        stats.total_bytes_stored = stats
            .total_bytes_stored
            .saturating_sub(removed.map_or(0, |o| o.data.len() as u64));
        Ok(())
    }
}
