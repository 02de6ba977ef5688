//! Blob store reached over HTTP, compatible with Vercel Blob's public-read,
//! token-write model.

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_MATCH, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::{BlobStore, Precondition, PutBlob, PutReceipt, StoredBlob};
use crate::error::BlobError;

pub const DEFAULT_WRITE_URL: &str = "https://blob.vercel-storage.com";

/// Body returned by the write API. Only the URL is used.
#[derive(Debug, Deserialize)]
struct PutResponse {
    url: Option<String>,
}

pub struct HttpBlobStore {
    client: reqwest::Client,
    read_url: String,
    write_url: String,
    token: Option<String>,
}

impl HttpBlobStore {
    /// `read_url` is the public base objects are fetched from, `write_url`
    /// the API base that accepts PUTs. Both get `/{key}` appended.
    pub fn new(
        read_url: impl Into<String>,
        write_url: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, BlobError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, read_url, write_url, token))
    }

    pub fn with_client(
        client: reqwest::Client,
        read_url: impl Into<String>,
        write_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            read_url: read_url.into().trim_end_matches('/').to_string(),
            write_url: write_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn read_url_for(&self, key: &str) -> String {
        format!("{}/{}", self.read_url, key)
    }

    fn write_url_for(&self, key: &str) -> String {
        format!("{}/{}", self.write_url, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get(&self, key: &str) -> Result<StoredBlob, BlobError> {
        let url = self.read_url_for(key);
        tracing::debug!(url = %url, "network: fetching blob");

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(BlobError::Status(status.as_u16()));
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let data = response.bytes().await?.to_vec();

        Ok(StoredBlob { data, etag })
    }

    async fn put(&self, key: &str, blob: PutBlob) -> Result<PutReceipt, BlobError> {
        let url = self.write_url_for(key);
        let bytes = blob.data.len();

        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, &blob.content_type)
            .header("x-content-type", &blob.content_type)
            .header("x-add-random-suffix", "0")
            .body(blob.data);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request = match &blob.precondition {
            Precondition::None => request,
            Precondition::IfMatch(etag) => request.header(IF_MATCH, etag),
            Precondition::IfAbsent => request.header(IF_NONE_MATCH, "*"),
        };

        tracing::debug!(url = %url, bytes, "network: uploading blob");
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::PRECONDITION_FAILED {
            return Err(BlobError::PreconditionFailed);
        }
        if !status.is_success() {
            return Err(BlobError::Status(status.as_u16()));
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Older store versions answer with an empty body; fall back to the public URL.
        let body = response.bytes().await?;
        let url = serde_json::from_slice::<PutResponse>(&body)
            .ok()
            .and_then(|r| r.url)
            .unwrap_or_else(|| self.read_url_for(key));

        Ok(PutReceipt { url, etag })
    }

    fn describe(&self) -> String {
        format!("http:{}", self.read_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_joined_without_double_slash() {
        let store = HttpBlobStore::new(
            "https://example.public.blob.vercel-storage.com/",
            DEFAULT_WRITE_URL,
            None,
        )
        .unwrap();
        assert_eq!(
            store.read_url_for("demo_recipes.json"),
            "https://example.public.blob.vercel-storage.com/demo_recipes.json"
        );
        assert_eq!(
            store.write_url_for("demo_recipes.json"),
            "https://blob.vercel-storage.com/demo_recipes.json"
        );
    }
}
