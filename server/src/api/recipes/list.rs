use crate::api::MessageResponse;
use crate::AppState;
use aldente_core::fetch_document_or_empty;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// The stored repository document, recipes passed through as stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RepositoryResponse {
    #[schema(value_type = Vec<Object>)]
    pub recipes: Vec<Value>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All stored recipes", body = RepositoryResponse),
        (status = 502, description = "Recipe store unavailable", body = MessageResponse)
    )
)]
pub async fn list_recipes(State(state): State<AppState>) -> impl IntoResponse {
    let saver = &state.saver;
    match fetch_document_or_empty(saver.store().as_ref(), &saver.options().key).await {
        Ok(document) => (
            StatusCode::OK,
            Json(RepositoryResponse {
                recipes: document.recipes,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to load recipes: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(MessageResponse::new("Failed to load recipes")),
            )
                .into_response()
        }
    }
}
