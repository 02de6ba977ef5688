use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Blob store returned status {0}")]
    Status(u16),

    #[error("Blob was modified since it was read")]
    PreconditionFailed,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Blob storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored repository is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Blob store misconfigured: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("Invalid recipe data received")]
    InvalidRecipeData,

    #[error("Invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid recipe format")]
    InvalidRecipeFormat(String),

    #[error("Failed to read existing recipes: {0}")]
    Upstream(#[source] BlobError),

    #[error("Failed to write recipes: {0}")]
    Store(#[source] BlobError),

    #[error("Recipe store kept changing, gave up after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error("Failed to encode repository: {0}")]
    Encode(#[source] serde_json::Error),
}

impl SaveError {
    /// Errors caused by the submitted payload, as opposed to storage
    /// failures on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SaveError::InvalidRecipeData
                | SaveError::InvalidJson(_)
                | SaveError::InvalidRecipeFormat(_)
        )
    }
}
