use crate::api::MessageResponse;
use crate::AppState;
use aldente_core::SaveError;
use axum::body::Bytes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaveRecipeRequest {
    /// JSON-encoded `{"recipes": [...]}` document. Only the first recipe is saved.
    pub recipe: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveRecipeResponse {
    pub message: String,
    /// Public URL of the updated repository
    pub url: String,
}

/// The body is taken as raw bytes so malformed envelopes get the same
/// 400 message as a missing `recipe` field instead of axum's rejection.
#[utoipa::path(
    post,
    path = "/saveRecipe",
    tag = "recipes",
    request_body = SaveRecipeRequest,
    responses(
        (status = 200, description = "Recipe appended to the repository", body = SaveRecipeResponse),
        (status = 400, description = "Invalid recipe data, JSON, or format", body = MessageResponse),
        (status = 500, description = "Storage failure", body = MessageResponse)
    )
)]
pub async fn save_recipe(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    match state.saver.save_submission(&body).await {
        Ok(saved) => (
            StatusCode::OK,
            Json(SaveRecipeResponse {
                message: "Recipe saved".to_string(),
                url: saved.url,
            }),
        )
            .into_response(),
        Err(e) if e.is_client_error() => {
            if let SaveError::InvalidRecipeFormat(reason) = &e {
                tracing::info!(reason = %reason, "rejected recipe submission");
            } else {
                tracing::info!(error = %e, "rejected recipe submission");
            }
            (StatusCode::BAD_REQUEST, Json(MessageResponse::new(e.to_string()))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to save recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::new("Internal Server Error")),
            )
                .into_response()
        }
    }
}
