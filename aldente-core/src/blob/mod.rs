//! Key-addressed blob storage.
//!
//! The recipe repository lives in a single object. Stores only move bytes;
//! decoding into [`crate::RecipeRepository`] happens in [`crate::repository`].

mod config;
mod file;
mod http;
mod memory;

pub use config::{BlobBackend, BlobStoreConfig};
pub use file::FileBlobStore;
pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;

use crate::error::BlobError;

/// Well-known key the repository is stored under.
pub const DEFAULT_BLOB_KEY: &str = "demo_recipes.json";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Blob contents plus the version token the store handed out with them.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub etag: Option<String>,
}

/// Condition a write must satisfy before it replaces the stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Overwrite whatever is there.
    None,
    /// Only write if the current version still has this token.
    IfMatch(String),
    /// Only write if nothing is stored under the key yet.
    IfAbsent,
}

#[derive(Debug, Clone)]
pub struct PutBlob {
    pub data: Vec<u8>,
    pub content_type: String,
    pub precondition: Precondition,
}

impl PutBlob {
    pub fn json(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: JSON_CONTENT_TYPE.to_string(),
            precondition: Precondition::None,
        }
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = precondition;
        self
    }
}

/// Result of a successful write.
#[derive(Debug, Clone)]
pub struct PutReceipt {
    /// Public URL the object can be read back from.
    pub url: String,
    pub etag: Option<String>,
}

/// Trait for blob stores, enabling in-memory stores in tests.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the object under `key`, bypassing any caches.
    async fn get(&self, key: &str) -> Result<StoredBlob, BlobError>;

    /// Replace the object under `key`. Names are never randomized, so this
    /// always overwrites.
    async fn put(&self, key: &str, blob: PutBlob) -> Result<PutReceipt, BlobError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Decide whether a write may proceed given the current version of the
/// object (`None` if absent). Shared by the local stores.
pub(crate) fn precondition_holds(precondition: &Precondition, current: Option<&str>) -> bool {
    match precondition {
        Precondition::None => true,
        Precondition::IfAbsent => current.is_none(),
        Precondition::IfMatch(expected) => current == Some(expected.as_str()),
    }
}
