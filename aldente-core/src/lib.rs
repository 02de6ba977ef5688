pub mod blob;
pub mod error;
pub mod repository;
pub mod save;
pub mod types;
pub mod walkthrough;

pub use blob::{
    BlobBackend, BlobStore, BlobStoreConfig, FileBlobStore, HttpBlobStore, MemoryBlobStore,
    Precondition, PutBlob, PutReceipt, StoredBlob, DEFAULT_BLOB_KEY,
};
pub use error::{BlobError, SaveError};
pub use repository::{
    fetch_document, fetch_document_or_empty, fetch_repository_or_empty, store_document,
    RecipeDocument, VersionedDocument,
};
pub use save::{
    parse_submission, FetchFailurePolicy, RecipeSaver, SaveOptions, SavedRecipe, Submission,
};
pub use types::{Recipe, RecipeRepository, RecipeValidationError, Step};
pub use walkthrough::{
    derive_timer_states, LoadState, NavAction, NavigationError, Navigator, SessionError,
    TimerBoard, TimerError, TimerState, View, WalkthroughSession,
};
