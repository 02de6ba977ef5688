//! Appending a submitted recipe to the stored repository.
//!
//! Submissions arrive as `{ "recipe": "<json>" }` where the inner string is
//! itself a `{ "recipes": [...] }` document. Only the first recipe is kept,
//! validated against the typed model but stored exactly as submitted.
//! Saving is a read-modify-write of the whole repository blob; writes carry
//! a precondition and are retried from a fresh read when another writer got
//! there first.

use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::blob::{BlobStore, Precondition, DEFAULT_BLOB_KEY};
use crate::error::{BlobError, SaveError};
use crate::repository::{fetch_document, store_document, RecipeDocument};
use crate::types::Recipe;

/// What to do when the existing repository cannot be read for a reason
/// other than "it does not exist yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Log a warning and save on top of an empty list. Keeps uploads working
    /// while the store is flaky, at the cost of possibly replacing data.
    #[default]
    TreatAsEmpty,
    /// Refuse to save.
    FailClosed,
}

impl FromStr for FetchFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(FetchFailurePolicy::TreatAsEmpty),
            "fail" => Ok(FetchFailurePolicy::FailClosed),
            other => Err(format!("unknown fetch failure policy: {}", other)),
        }
    }
}

/// A decoded submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Typed view, used for validation and logging.
    pub recipe: Recipe,
    /// `recipes[0]` as submitted; this is what gets stored.
    pub raw: Value,
    /// Recipes after the first one in the payload; these are dropped.
    pub discarded: usize,
}

/// Parse and validate a raw request body. Never touches storage.
pub fn parse_submission(body: &[u8]) -> Result<Submission, SaveError> {
    let envelope: Value = serde_json::from_slice(body).map_err(SaveError::MalformedBody)?;
    let recipe_json = envelope
        .get("recipe")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(SaveError::InvalidRecipeData)?;

    let parsed: Value = serde_json::from_str(recipe_json).map_err(SaveError::InvalidJson)?;

    let recipes = parsed
        .get("recipes")
        .and_then(Value::as_array)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| {
            SaveError::InvalidRecipeFormat("recipes must be a non-empty array".to_string())
        })?;

    let raw = &recipes[0];
    let recipe = Recipe::deserialize(raw).map_err(|e| SaveError::InvalidRecipeFormat(e.to_string()))?;
    recipe
        .validate()
        .map_err(|e| SaveError::InvalidRecipeFormat(e.to_string()))?;

    Ok(Submission {
        recipe,
        raw: raw.clone(),
        discarded: recipes.len() - 1,
    })
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub key: String,
    pub fetch_failure: FetchFailurePolicy,
    /// Total write attempts before giving up on a contended key.
    pub max_attempts: u32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_BLOB_KEY.to_string(),
            fetch_failure: FetchFailurePolicy::default(),
            max_attempts: 3,
        }
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone)]
pub struct SavedRecipe {
    pub url: String,
    pub recipe_count: usize,
    pub attempts: u32,
}

/// Serializes saves in this process and appends recipes to the stored
/// repository with conditional writes.
pub struct RecipeSaver {
    store: Arc<dyn BlobStore>,
    options: SaveOptions,
    lock: Mutex<()>,
}

impl RecipeSaver {
    pub fn new(store: Arc<dyn BlobStore>, options: SaveOptions) -> Self {
        Self {
            store,
            options,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    /// Parse a raw submission and save its first recipe.
    pub async fn save_submission(&self, body: &[u8]) -> Result<SavedRecipe, SaveError> {
        let submission = parse_submission(body)?;
        if submission.discarded > 0 {
            tracing::debug!(
                discarded = submission.discarded,
                "ignoring extra recipes in submission"
            );
        }
        self.save(&submission).await
    }

    /// Append a parsed submission to the stored repository.
    pub async fn save(&self, submission: &Submission) -> Result<SavedRecipe, SaveError> {
        let _guard = self.lock.lock().await;
        let key = self.options.key.as_str();
        let max_attempts = self.options.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let (mut document, precondition) = self.read_current(key).await?;
            document.push(submission.raw.clone());

            match store_document(self.store.as_ref(), key, &document, precondition).await {
                Ok(receipt) => {
                    tracing::info!(
                        recipe = %submission.recipe.name,
                        recipes = document.len(),
                        url = %receipt.url,
                        attempt,
                        "recipe saved"
                    );
                    return Ok(SavedRecipe {
                        url: receipt.url,
                        recipe_count: document.len(),
                        attempts: attempt,
                    });
                }
                Err(BlobError::PreconditionFailed) => {
                    tracing::warn!(attempt, key, "repository changed during save, re-reading");
                }
                Err(BlobError::Decode(e)) => return Err(SaveError::Encode(e)),
                Err(e) => return Err(SaveError::Store(e)),
            }
        }

        Err(SaveError::Conflict {
            attempts: max_attempts,
        })
    }

    async fn read_current(
        &self,
        key: &str,
    ) -> Result<(RecipeDocument, Precondition), SaveError> {
        match fetch_document(self.store.as_ref(), key).await {
            Ok(versioned) => {
                let precondition = versioned.write_precondition();
                Ok((versioned.document, precondition))
            }
            Err(BlobError::NotFound(_)) => Ok((RecipeDocument::default(), Precondition::IfAbsent)),
            Err(e) => match self.options.fetch_failure {
                FetchFailurePolicy::TreatAsEmpty => {
                    tracing::warn!(error = %e, key, "blob fetch failed, saving over an empty list");
                    Ok((RecipeDocument::default(), Precondition::None))
                }
                FetchFailurePolicy::FailClosed => Err(SaveError::Upstream(e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use serde_json::json;

    fn body(recipe: &Value) -> Vec<u8> {
        serde_json::to_vec(&json!({ "recipe": recipe.to_string() })).unwrap()
    }

    fn toast() -> Value {
        json!({
            "name": "Toast",
            "serving_size": 1,
            "ingredients": ["bread"],
            "steps": [{"stepNumber": 1, "totalSteps": 1, "title": "Toast", "description": "Toast the bread", "timerDuration": 3}]
        })
    }

    #[test]
    fn test_missing_recipe_field() {
        let result = parse_submission(br#"{"name": "Toast"}"#);
        assert!(matches!(result, Err(SaveError::InvalidRecipeData)));
    }

    #[test]
    fn test_non_string_recipe_field() {
        let result = parse_submission(br#"{"recipe": {"recipes": []}}"#);
        assert!(matches!(result, Err(SaveError::InvalidRecipeData)));
        let result = parse_submission(br#"{"recipe": ""}"#);
        assert!(matches!(result, Err(SaveError::InvalidRecipeData)));
    }

    #[test]
    fn test_body_not_json_is_server_error() {
        let err = parse_submission(b"recipe=toast").unwrap_err();
        assert!(matches!(err, SaveError::MalformedBody(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_non_object_body() {
        let result = parse_submission(b"[1, 2]");
        assert!(matches!(result, Err(SaveError::InvalidRecipeData)));
    }

    #[test]
    fn test_recipe_not_json() {
        let result = parse_submission(br#"{"recipe": "{not json"}"#);
        let err = result.unwrap_err();
        assert!(matches!(err, SaveError::InvalidJson(_)));
        assert_eq!(err.to_string(), "Invalid JSON format");
    }

    #[test]
    fn test_empty_recipes() {
        let result = parse_submission(&body(&json!({"recipes": []})));
        let err = result.unwrap_err();
        assert!(matches!(err, SaveError::InvalidRecipeFormat(_)));
        assert_eq!(err.to_string(), "Invalid recipe format");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_recipes_not_array() {
        let result = parse_submission(&body(&json!({"recipes": {"name": "Toast"}})));
        assert!(matches!(result, Err(SaveError::InvalidRecipeFormat(_))));
    }

    #[test]
    fn test_schema_violation_is_invalid_format() {
        let result = parse_submission(&body(&json!({"recipes": [{"name": "Toast"}]})));
        assert!(matches!(result, Err(SaveError::InvalidRecipeFormat(_))));
    }

    #[test]
    fn test_extra_recipes_are_discarded() {
        let submission =
            parse_submission(&body(&json!({"recipes": [toast(), toast(), toast()]}))).unwrap();
        assert_eq!(submission.recipe.name, "Toast");
        assert_eq!(submission.raw, toast());
        assert_eq!(submission.discarded, 2);
    }

    #[tokio::test]
    async fn test_save_into_empty_store() {
        let store = Arc::new(MemoryBlobStore::new());
        let saver = RecipeSaver::new(store.clone(), SaveOptions::default());

        let saved = saver
            .save_submission(&body(&json!({"recipes": [toast()]})))
            .await
            .unwrap();
        assert_eq!(saved.recipe_count, 1);
        assert_eq!(saved.url, "memory://demo_recipes.json");

        let stored: Value =
            serde_json::from_slice(&store.contents("demo_recipes.json").await.unwrap()).unwrap();
        assert_eq!(stored, json!({"recipes": [toast()]}));
    }

    #[tokio::test]
    async fn test_invalid_submission_never_writes() {
        let store = Arc::new(MemoryBlobStore::new());
        store.insert("demo_recipes.json", r#"{"recipes": []}"#).await;
        let saver = RecipeSaver::new(store.clone(), SaveOptions::default());

        assert!(saver.save_submission(br#"{"recipe": "nope"}"#).await.is_err());
        assert!(saver
            .save_submission(&body(&json!({"recipes": []})))
            .await
            .is_err());
        assert_eq!(store.write_count().await, 1);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "empty".parse::<FetchFailurePolicy>().unwrap(),
            FetchFailurePolicy::TreatAsEmpty
        );
        assert_eq!(
            "FAIL".parse::<FetchFailurePolicy>().unwrap(),
            FetchFailurePolicy::FailClosed
        );
        assert!("retry".parse::<FetchFailurePolicy>().is_err());
    }
}
