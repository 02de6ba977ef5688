//! Save-recipe behaviour against in-memory and failing stores.

use aldente_core::{
    fetch_document, BlobError, BlobStore, FetchFailurePolicy, MemoryBlobStore, Precondition,
    PutBlob, PutReceipt, RecipeRepository, RecipeSaver, SaveError, SaveOptions, StoredBlob,
    DEFAULT_BLOB_KEY,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::sync::Mutex;

fn recipe(name: &str) -> Value {
    json!({
        "name": name,
        "serving_size": 2,
        "ingredients": [{"item": "eggs", "amount": "2"}],
        "steps": [
            {"stepNumber": 1, "totalSteps": 2, "title": "Whisk", "description": "Whisk the eggs"},
            {"stepNumber": 2, "totalSteps": 2, "title": "Cook", "description": "Cook gently", "timerDuration": 4}
        ]
    })
}

fn submission(recipes: Vec<Value>) -> Vec<u8> {
    let inner = json!({ "recipes": recipes }).to_string();
    serde_json::to_vec(&json!({ "recipe": inner })).unwrap()
}

async fn stored(store: &MemoryBlobStore) -> Value {
    serde_json::from_slice(&store.contents(DEFAULT_BLOB_KEY).await.unwrap()).unwrap()
}

#[tokio::test]
async fn test_save_appends_to_existing() {
    let store = Arc::new(MemoryBlobStore::new());
    let existing = json!({"recipes": [recipe("Omelette"), recipe("Frittata")]});
    store
        .insert(DEFAULT_BLOB_KEY, existing.to_string())
        .await;
    let saver = RecipeSaver::new(store.clone(), SaveOptions::default());

    let saved = saver
        .save_submission(&submission(vec![recipe("Scramble"), recipe("Ignored")]))
        .await
        .unwrap();
    assert_eq!(saved.recipe_count, 3);
    assert_eq!(saved.attempts, 1);

    let after = stored(&store).await;
    let recipes = after["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 3);
    assert_eq!(recipes[0], recipe("Omelette"));
    assert_eq!(recipes[2], recipe("Scramble"));
}

#[tokio::test]
async fn test_save_keeps_recipes_outside_the_model() {
    let store = Arc::new(MemoryBlobStore::new());
    let loose = vec![
        json!({"name": "Old", "serving_size": "4", "ingredients": [], "steps": []}),
        json!({"name": "No steps yet"}),
        json!({"name": "Float numbers", "steps": [
            {"stepNumber": 1.0, "totalSteps": 1.0, "title": "Stir", "description": "Stir"}
        ]}),
    ];
    store
        .insert(DEFAULT_BLOB_KEY, json!({ "recipes": loose.clone() }).to_string())
        .await;
    let saver = RecipeSaver::new(store.clone(), SaveOptions::default());

    let saved = saver
        .save_submission(&submission(vec![recipe("Toast")]))
        .await
        .unwrap();
    assert_eq!(saved.recipe_count, 4);

    let mut expected = loose;
    expected.push(recipe("Toast"));
    assert_eq!(stored(&store).await, json!({ "recipes": expected }));
}

#[tokio::test]
async fn test_saved_recipe_is_stored_as_submitted() {
    let store = Arc::new(MemoryBlobStore::new());
    let saver = RecipeSaver::new(store.clone(), SaveOptions::default());

    let submitted = json!({
        "name": "Nulls",
        "serving_size": 3,
        "ingredients": null,
        "source": {"book": "Family notes", "page": 12},
        "steps": [{
            "stepNumber": 1,
            "totalSteps": 1,
            "title": "Rest",
            "description": "Let it rest",
            "imageUrl": null,
            "timerDuration": null,
            "demonstration": null,
            "helpfulTip": null
        }]
    });
    saver
        .save_submission(&submission(vec![submitted.clone()]))
        .await
        .unwrap();

    let after = stored(&store).await;
    let recipes = after["recipes"].as_array().unwrap();
    assert_eq!(recipes.last(), Some(&submitted));
}

#[tokio::test]
async fn test_concurrent_saves_on_one_saver_both_land() {
    let store = Arc::new(MemoryBlobStore::new());
    let saver = Arc::new(RecipeSaver::new(store.clone(), SaveOptions::default()));

    let a = saver.clone();
    let b = saver.clone();
    let first = tokio::spawn(async move { a.save_submission(&submission(vec![recipe("A")])).await });
    let second =
        tokio::spawn(async move { b.save_submission(&submission(vec![recipe("B")])).await });
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let repo: RecipeRepository = serde_json::from_value(stored(&store).await).unwrap();
    assert_eq!(repo.len(), 2);
    assert!(repo.find("A").is_some());
    assert!(repo.find("B").is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_saves_across_savers_both_land() {
    // Separate savers share no lock; only the conditional write keeps both recipes.
    let store = Arc::new(MemoryBlobStore::new());
    let left = RecipeSaver::new(store.clone(), SaveOptions::default());
    let right = RecipeSaver::new(store.clone(), SaveOptions::default());

    let body_a = submission(vec![recipe("A")]);
    let body_b = submission(vec![recipe("B")]);
    let (a, b) = tokio::join!(left.save_submission(&body_a), right.save_submission(&body_b));
    a.unwrap();
    b.unwrap();

    let versioned = fetch_document(store.as_ref(), DEFAULT_BLOB_KEY)
        .await
        .unwrap();
    assert_eq!(versioned.document.len(), 2);
}

/// Store whose reads always fail and whose writes are recorded.
#[derive(Default)]
struct UnreadableStore {
    puts: Mutex<Vec<(Vec<u8>, Precondition)>>,
}

#[async_trait]
impl BlobStore for UnreadableStore {
    async fn get(&self, _key: &str) -> Result<StoredBlob, BlobError> {
        Err(BlobError::Status(503))
    }

    async fn put(&self, key: &str, blob: PutBlob) -> Result<PutReceipt, BlobError> {
        self.puts
            .lock()
            .unwrap()
            .push((blob.data, blob.precondition));
        Ok(PutReceipt {
            url: format!("https://blobs.test/{}", key),
            etag: None,
        })
    }

    fn describe(&self) -> String {
        "unreadable".to_string()
    }
}

#[tokio::test]
async fn test_fetch_failure_treated_as_empty() {
    let store = Arc::new(UnreadableStore::default());
    let saver = RecipeSaver::new(store.clone(), SaveOptions::default());

    let saved = saver
        .save_submission(&submission(vec![recipe("Toast")]))
        .await
        .unwrap();
    assert_eq!(saved.url, "https://blobs.test/demo_recipes.json");
    assert_eq!(saved.recipe_count, 1);

    let puts = store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].1, Precondition::None);
    let written: Value = serde_json::from_slice(&puts[0].0).unwrap();
    assert_eq!(written, json!({"recipes": [recipe("Toast")]}));
}

#[tokio::test]
async fn test_fetch_failure_fail_closed() {
    let store = Arc::new(UnreadableStore::default());
    let saver = RecipeSaver::new(
        store.clone(),
        SaveOptions {
            fetch_failure: FetchFailurePolicy::FailClosed,
            ..Default::default()
        },
    );

    let err = saver
        .save_submission(&submission(vec![recipe("Toast")]))
        .await
        .unwrap_err();
    assert!(matches!(err, SaveError::Upstream(BlobError::Status(503))));
    assert!(!err.is_client_error());
    assert!(store.puts.lock().unwrap().is_empty());
}

/// Store that always reports a concurrent modification on write.
struct ContendedStore {
    inner: MemoryBlobStore,
}

#[async_trait]
impl BlobStore for ContendedStore {
    async fn get(&self, key: &str) -> Result<StoredBlob, BlobError> {
        self.inner.get(key).await
    }

    async fn put(&self, _key: &str, _blob: PutBlob) -> Result<PutReceipt, BlobError> {
        Err(BlobError::PreconditionFailed)
    }

    fn describe(&self) -> String {
        "contended".to_string()
    }
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let store = Arc::new(ContendedStore {
        inner: MemoryBlobStore::new(),
    });
    let saver = RecipeSaver::new(
        store,
        SaveOptions {
            max_attempts: 2,
            ..Default::default()
        },
    );

    let err = saver
        .save_submission(&submission(vec![recipe("Toast")]))
        .await
        .unwrap_err();
    assert!(matches!(err, SaveError::Conflict { attempts: 2 }));
}
