// src/api/http/models.rs
// Model catalogue and favourites

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use super::handlers::json_body;
use crate::api::error::{ApiResult, missing_param_error};
use crate::models::{from_openrouter, merge_catalogue};
use crate::state::AppState;

/// GET /api/ai/models
///
/// Any upstream failure falls back to the built-in catalogue.
pub async fn models_handler(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let favorites = state.favorites.list().await.unwrap_or_else(|e| {
        warn!("Could not read favourites: {}", e);
        Vec::new()
    });

    let models = match state.dispatcher.openrouter_models().await {
        Ok(entries) => {
            let fetched = entries.iter().filter_map(from_openrouter).collect();
            merge_catalogue(fetched, &favorites)
        }
        Err(e) => {
            warn!("Failed to fetch models from OpenRouter, using defaults: {}", e);
            merge_catalogue(Vec::new(), &favorites)
        }
    };

    Ok(Json(json!({ "models": models })))
}

/// GET /api/favorites
pub async fn get_favorites(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let favorites = state.favorites.list().await?;
    Ok(Json(json!({ "favorites": favorites })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    #[serde(default)]
    pub model_id: String,
}

/// POST /api/favorites
pub async fn toggle_favorite(
    State(state): State<AppState>,
    payload: Result<Json<ToggleFavoriteRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    let model_id = request.model_id.trim();
    if model_id.is_empty() {
        return Err(missing_param_error("modelId"));
    }

    let is_favorite = state.favorites.toggle(model_id).await?;
    Ok(Json(json!({ "isFavorite": is_favorite })))
}
