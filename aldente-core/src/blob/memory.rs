use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{precondition_holds, BlobStore, PutBlob, PutReceipt, StoredBlob};
use crate::error::BlobError;

#[derive(Debug, Clone)]
struct Entry {
    data: Vec<u8>,
    content_type: String,
    version: u64,
}

/// Process-local blob store. Versions increase on every write, so
/// conditional writes behave like a real versioned store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, Entry>>,
    writes: RwLock<u64>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an object, as if it had been written earlier.
    pub async fn insert(&self, key: &str, data: impl Into<Vec<u8>>) {
        let version = self.next_version().await;
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                data: data.into(),
                content_type: super::JSON_CONTENT_TYPE.to_string(),
                version,
            },
        );
    }

    /// Raw stored bytes, if any.
    pub async fn contents(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().await.get(key).map(|e| e.data.clone())
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|e| e.content_type.clone())
    }

    /// Number of successful writes, including seeded objects.
    pub async fn write_count(&self) -> u64 {
        *self.writes.read().await
    }

    async fn next_version(&self) -> u64 {
        let mut writes = self.writes.write().await;
        *writes += 1;
        *writes
    }

    fn url_for(key: &str) -> String {
        format!("memory://{}", key)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<StoredBlob, BlobError> {
        let entries = self.entries.read().await;
        let entry = entries
            .get(key)
            .ok_or_else(|| BlobError::NotFound(key.to_string()))?;
        Ok(StoredBlob {
            data: entry.data.clone(),
            etag: Some(entry.version.to_string()),
        })
    }

    async fn put(&self, key: &str, blob: PutBlob) -> Result<PutReceipt, BlobError> {
        // Hold the map lock across check-and-write so preconditions are atomic.
        let mut entries = self.entries.write().await;
        let current = entries.get(key).map(|e| e.version.to_string());
        if !precondition_holds(&blob.precondition, current.as_deref()) {
            return Err(BlobError::PreconditionFailed);
        }

        let version = self.next_version().await;
        entries.insert(
            key.to_string(),
            Entry {
                data: blob.data,
                content_type: blob.content_type,
                version,
            },
        );

        Ok(PutReceipt {
            url: Self::url_for(key),
            etag: Some(version.to_string()),
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
