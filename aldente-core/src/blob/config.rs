use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use super::http::DEFAULT_WRITE_URL;
use super::{BlobStore, FileBlobStore, HttpBlobStore, MemoryBlobStore, DEFAULT_BLOB_KEY};
use crate::error::BlobError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    Http,
    Memory,
    File,
}

impl FromStr for BlobBackend {
    type Err = BlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(BlobBackend::Http),
            "memory" => Ok(BlobBackend::Memory),
            "file" => Ok(BlobBackend::File),
            other => Err(BlobError::Config(format!("unknown blob backend: {}", other))),
        }
    }
}

/// Where the repository blob lives and how to reach it.
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    pub backend: BlobBackend,
    pub key: String,
    pub read_url: Option<String>,
    pub write_url: String,
    pub token: Option<String>,
    pub dir: Option<PathBuf>,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::Http,
            key: DEFAULT_BLOB_KEY.to_string(),
            read_url: None,
            write_url: DEFAULT_WRITE_URL.to_string(),
            token: None,
            dir: None,
        }
    }
}

impl BlobStoreConfig {
    /// Read configuration from the environment.
    ///
    /// Environment variables:
    /// - `ALDENTE_BLOB_BACKEND`: "http" (default), "memory", or "file"
    /// - `ALDENTE_BLOB_KEY`: object key (default `demo_recipes.json`)
    /// - `ALDENTE_BLOB_READ_URL`: public base URL objects are read from
    /// - `ALDENTE_BLOB_WRITE_URL`: API base URL for uploads
    /// - `BLOB_READ_WRITE_TOKEN`: bearer token for uploads
    /// - `ALDENTE_BLOB_DIR`: directory for the file backend
    pub fn from_env() -> Result<Self, BlobError> {
        let defaults = Self::default();
        let backend = match non_empty_var("ALDENTE_BLOB_BACKEND") {
            Some(val) => val.parse()?,
            None => defaults.backend,
        };

        Ok(Self {
            backend,
            key: non_empty_var("ALDENTE_BLOB_KEY").unwrap_or(defaults.key),
            read_url: non_empty_var("ALDENTE_BLOB_READ_URL"),
            write_url: non_empty_var("ALDENTE_BLOB_WRITE_URL").unwrap_or(defaults.write_url),
            token: non_empty_var("BLOB_READ_WRITE_TOKEN"),
            dir: non_empty_var("ALDENTE_BLOB_DIR").map(PathBuf::from),
        })
    }

    /// Construct the configured store.
    pub fn build(&self) -> Result<Arc<dyn BlobStore>, BlobError> {
        let store: Arc<dyn BlobStore> = match self.backend {
            BlobBackend::Http => {
                let read_url = self.read_url.clone().ok_or_else(|| {
                    BlobError::Config("ALDENTE_BLOB_READ_URL must be set".to_string())
                })?;
                Arc::new(HttpBlobStore::new(
                    read_url,
                    self.write_url.clone(),
                    self.token.clone(),
                )?)
            }
            BlobBackend::Memory => Arc::new(MemoryBlobStore::new()),
            BlobBackend::File => {
                let dir = self.dir.clone().unwrap_or_else(|| PathBuf::from("data"));
                Arc::new(FileBlobStore::new(dir))
            }
        };

        tracing::debug!(store = %store.describe(), key = %self.key, "blob store configured");
        Ok(store)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!("HTTP".parse::<BlobBackend>().unwrap(), BlobBackend::Http);
        assert_eq!("memory".parse::<BlobBackend>().unwrap(), BlobBackend::Memory);
        assert_eq!(" file ".parse::<BlobBackend>().unwrap(), BlobBackend::File);
        assert!("s3".parse::<BlobBackend>().is_err());
    }

    #[test]
    fn test_http_backend_requires_read_url() {
        let config = BlobStoreConfig::default();
        assert!(matches!(config.build(), Err(BlobError::Config(_))));
    }

    #[test]
    fn test_memory_backend_builds() {
        let config = BlobStoreConfig {
            backend: BlobBackend::Memory,
            ..Default::default()
        };
        let store = config.build().unwrap();
        assert_eq!(store.describe(), "memory");
        assert_eq!(config.key, "demo_recipes.json");
    }
}
