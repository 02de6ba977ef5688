//! Calls against a running aldente-server.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct SavedRecipe {
    pub message: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

fn endpoint(server: &str, path: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), path)
}

pub async fn ping(server: &str) -> Result<String> {
    let response = reqwest::get(endpoint(server, "/api/test/unauthed-ping"))
        .await
        .context("Failed to reach server")?
        .error_for_status()?;
    let body: MessageResponse = response.json().await?;
    Ok(body.message)
}

/// POST a repository document, wrapped the way `/saveRecipe` expects.
pub async fn save_recipe(server: &str, document: &str) -> Result<SavedRecipe> {
    let response = reqwest::Client::new()
        .post(endpoint(server, "/saveRecipe"))
        .json(&json!({ "recipe": document }))
        .send()
        .await
        .context("Failed to reach server")?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<MessageResponse>()
            .await
            .map(|m| m.message)
            .unwrap_or_else(|_| status.to_string());
        bail!("Save failed ({}): {}", status.as_u16(), message);
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://localhost:3000/", "/saveRecipe"),
            "http://localhost:3000/saveRecipe"
        );
        assert_eq!(
            endpoint("http://localhost:3000", "/saveRecipe"),
            "http://localhost:3000/saveRecipe"
        );
    }
}
