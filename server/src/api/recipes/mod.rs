pub mod list;
pub mod save;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Recipe routes. Mounted at the root: the upload path predates the
/// `/api` prefix and existing clients post to `/saveRecipe`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/saveRecipe", post(save::save_recipe))
        .route("/api/recipes", get(list::list_recipes))
}

#[derive(OpenApi)]
#[openapi(
    paths(save::save_recipe, list::list_recipes),
    components(schemas(
        save::SaveRecipeRequest,
        save::SaveRecipeResponse,
        list::RepositoryResponse,
    ))
)]
pub struct ApiDoc;
