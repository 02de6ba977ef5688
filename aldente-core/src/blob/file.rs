//! Directory-backed blob store for offline development.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use super::{precondition_holds, BlobStore, PutBlob, PutReceipt, StoredBlob};
use crate::error::BlobError;

/// Stores each key as a file in `root`. The etag is the SHA-256 of the
/// file contents, so edits made outside this process are also detected.
pub struct FileBlobStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(BlobError::Config(format!("invalid blob key: {:?}", key)));
        }
        Ok(self.root.join(key))
    }

    async fn read(path: &Path) -> Result<Option<Vec<u8>>, BlobError> {
        match fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn etag_of(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<StoredBlob, BlobError> {
        let path = self.path_for(key)?;
        let data = Self::read(&path)
            .await?
            .ok_or_else(|| BlobError::NotFound(key.to_string()))?;
        let etag = etag_of(&data);
        Ok(StoredBlob {
            data,
            etag: Some(etag),
        })
    }

    async fn put(&self, key: &str, blob: PutBlob) -> Result<PutReceipt, BlobError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;

        let current = Self::read(&path).await?.map(|data| etag_of(&data));
        if !precondition_holds(&blob.precondition, current.as_deref()) {
            return Err(BlobError::PreconditionFailed);
        }

        fs::create_dir_all(&self.root).await?;
        // Write to a sibling file and rename so readers never see a partial document.
        let tmp = self.root.join(format!(".{}.tmp", key));
        fs::write(&tmp, &blob.data).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), bytes = blob.data.len(), "wrote blob");

        Ok(PutReceipt {
            url: format!("file://{}", path.display()),
            etag: Some(etag_of(&blob.data)),
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::super::Precondition;
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_roundtrip_and_etag() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().join("blobs"));

        assert!(matches!(
            store.get("recipes.json").await,
            Err(BlobError::NotFound(_))
        ));

        let receipt = store
            .put("recipes.json", PutBlob::json(b"{\"recipes\":[]}".to_vec()))
            .await
            .unwrap();
        assert!(receipt.url.starts_with("file://"));

        let blob = store.get("recipes.json").await.unwrap();
        assert_eq!(blob.data, b"{\"recipes\":[]}");
        assert_eq!(blob.etag, receipt.etag);
    }

    #[tokio::test]
    async fn test_external_edit_breaks_if_match() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path());
        store
            .put("r.json", PutBlob::json(b"a".to_vec()))
            .await
            .unwrap();
        let seen = store.get("r.json").await.unwrap();

        std::fs::write(dir.path().join("r.json"), b"edited by hand").unwrap();

        let result = store
            .put(
                "r.json",
                PutBlob::json(b"b".to_vec())
                    .with_precondition(Precondition::IfMatch(seen.etag.unwrap())),
            )
            .await;
        assert!(matches!(result, Err(BlobError::PreconditionFailed)));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path());
        let result = store.get("../etc/passwd").await;
        assert!(matches!(result, Err(BlobError::Config(_))));
    }

    #[tokio::test]
    async fn test_put_creates_root_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("blobs");
        let store = FileBlobStore::new(&root);

        store
            .put("demo_recipes.json", PutBlob::json(b"{}".to_vec()))
            .await
            .unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&root).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["demo_recipes.json"]);
    }
}
