//! Loading and storing the recipe repository document.
//!
//! Two views of the same blob: [`RecipeDocument`] keeps every recipe as raw
//! JSON and is what gets read, appended to, and written back;
//! [`RecipeRepository`] is the typed view the walkthrough needs. Recipes
//! that don't fit the typed model are skipped in the typed view and left
//! untouched in the stored one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blob::{BlobStore, Precondition, PutBlob, PutReceipt};
use crate::error::BlobError;
use crate::types::{Recipe, RecipeRepository};

/// The stored `{ "recipes": [...] }` document with recipes kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeDocument {
    pub recipes: Vec<Value>,
}

impl RecipeDocument {
    /// Decode a stored blob. The blob must be JSON; a document without a
    /// `recipes` array holds no recipes.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(data)?;
        let recipes = match value {
            Value::Object(mut map) => match map.remove("recipes") {
                Some(Value::Array(recipes)) => recipes,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(Self { recipes })
    }

    pub fn push(&mut self, recipe: Value) {
        self.recipes.push(recipe);
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Typed view of the document. Returns the repository and how many
    /// recipes were skipped because they don't decode.
    pub fn to_repository(&self) -> (RecipeRepository, usize) {
        let mut skipped = 0;
        let recipes = self
            .recipes
            .iter()
            .filter_map(|raw| match Recipe::deserialize(raw) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(error = %e, "skipping recipe that does not match the model");
                    None
                }
            })
            .collect();
        (RecipeRepository::new(recipes), skipped)
    }

    /// Serialize the way it is stored: pretty-printed JSON.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

/// A document together with the store's version token for it.
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    pub document: RecipeDocument,
    pub etag: Option<String>,
}

impl VersionedDocument {
    /// Precondition under which writing back this document is safe.
    pub fn write_precondition(&self) -> Precondition {
        match &self.etag {
            Some(etag) => Precondition::IfMatch(etag.clone()),
            None => Precondition::None,
        }
    }
}

/// Fetch the document stored under `key`.
///
/// A missing key is reported as [`BlobError::NotFound`]; callers decide
/// whether that means "empty".
pub async fn fetch_document(
    store: &dyn BlobStore,
    key: &str,
) -> Result<VersionedDocument, BlobError> {
    let blob = store.get(key).await?;
    let document = RecipeDocument::from_slice(&blob.data)?;
    tracing::debug!(key, recipes = document.len(), "loaded recipe document");
    Ok(VersionedDocument {
        document,
        etag: blob.etag,
    })
}

/// Fetch the document, treating a missing key as an empty one.
pub async fn fetch_document_or_empty(
    store: &dyn BlobStore,
    key: &str,
) -> Result<RecipeDocument, BlobError> {
    match fetch_document(store, key).await {
        Ok(versioned) => Ok(versioned.document),
        Err(BlobError::NotFound(_)) => Ok(RecipeDocument::default()),
        Err(e) => Err(e),
    }
}

/// Fetch the typed repository for viewing. Missing key → empty; recipes
/// that don't decode are left out.
pub async fn fetch_repository_or_empty(
    store: &dyn BlobStore,
    key: &str,
) -> Result<RecipeRepository, BlobError> {
    let document = fetch_document_or_empty(store, key).await?;
    let (repository, skipped) = document.to_repository();
    if skipped > 0 {
        tracing::warn!(key, skipped, "some stored recipes could not be read");
    }
    Ok(repository)
}

/// Overwrite the stored document.
pub async fn store_document(
    store: &dyn BlobStore,
    key: &str,
    document: &RecipeDocument,
    precondition: Precondition,
) -> Result<PutReceipt, BlobError> {
    let data = document.encode()?;
    store
        .put(key, PutBlob::json(data).with_precondition(precondition))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_key_is_empty() {
        let store = MemoryBlobStore::new();
        let repo = fetch_repository_or_empty(&store, "demo_recipes.json")
            .await
            .unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_blob_is_an_error() {
        let store = MemoryBlobStore::new();
        store.insert("demo_recipes.json", "<html>oops</html>").await;
        let result = fetch_repository_or_empty(&store, "demo_recipes.json").await;
        assert!(matches!(result, Err(BlobError::Decode(_))));
    }

    #[test]
    fn test_document_without_recipes_array_is_empty() {
        let doc = RecipeDocument::from_slice(br#"{"recipes": "none"}"#).unwrap();
        assert!(doc.is_empty());
        let doc = RecipeDocument::from_slice(b"[1, 2]").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_typed_view_skips_loose_recipes() {
        let doc = RecipeDocument {
            recipes: vec![
                json!({"name": "Old", "serving_size": "4", "ingredients": [], "steps": []}),
                json!({"name": "Toast", "steps": [
                    {"stepNumber": 1, "totalSteps": 1, "title": "Toast", "description": "Toast it"}
                ]}),
                json!("not even an object"),
            ],
        };
        let (repo, skipped) = doc.to_repository();
        assert_eq!(skipped, 2);
        assert_eq!(repo.names(), vec!["Toast"]);
    }

    #[tokio::test]
    async fn test_store_writes_pretty_json() {
        let store = MemoryBlobStore::new();
        store_document(
            &store,
            "demo_recipes.json",
            &RecipeDocument::default(),
            Precondition::None,
        )
        .await
        .unwrap();
        let raw = store.contents("demo_recipes.json").await.unwrap();
        assert_eq!(String::from_utf8(raw).unwrap(), "{\n  \"recipes\": []\n}");

        let versioned = fetch_document(&store, "demo_recipes.json").await.unwrap();
        assert!(matches!(
            versioned.write_precondition(),
            Precondition::IfMatch(_)
        ));
    }
}
