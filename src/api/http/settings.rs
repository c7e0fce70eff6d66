// src/api/http/settings.rs
// Provider keys, AI settings and header appearance

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use super::handlers::json_body;
use crate::api::error::{ApiResult, missing_param_error};
use crate::settings::{AiSettings, HeaderSettings};
use crate::state::AppState;

// ============================================================================
// API keys (.env)
// ============================================================================

/// GET /api/settings/get-api-keys: names of keys with a value, never the values
pub async fn get_api_keys(State(state): State<AppState>) -> ApiResult<Json<BTreeMap<String, bool>>> {
    let present = state
        .env_file
        .load()
        .await?
        .map(|env| env.present_keys())
        .unwrap_or_default();
    Ok(Json(present))
}

#[derive(Debug, Deserialize)]
pub struct SaveKeysRequest {
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

/// POST /api/settings/save-api-keys
pub async fn save_api_keys(
    State(state): State<AppState>,
    payload: Result<Json<SaveKeysRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    state
        .env_file
        .save_keys(request.keys.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteKeyRequest {
    #[serde(default)]
    pub key: String,
}

/// POST /api/settings/delete-api-key
pub async fn delete_api_key(
    State(state): State<AppState>,
    payload: Result<Json<DeleteKeyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    if request.key.trim().is_empty() {
        return Err(missing_param_error("key"));
    }
    state.env_file.delete_key(&request.key).await?;
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// AI settings
// ============================================================================

pub async fn get_ai_settings(State(state): State<AppState>) -> ApiResult<Json<AiSettings>> {
    Ok(Json(state.ai_settings.load().await?))
}

pub async fn save_ai_settings(
    State(state): State<AppState>,
    payload: Result<Json<AiSettings>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let settings = json_body(payload)?;
    state.ai_settings.save(&settings).await?;
    Ok(Json(json!({ "message": "Settings saved successfully" })))
}

// ============================================================================
// Header settings
// ============================================================================

pub async fn get_header_settings(
    State(state): State<AppState>,
) -> ApiResult<Json<HeaderSettings>> {
    Ok(Json(state.header_settings.load().await?))
}

/// PATCH merges the given fields over the stored settings
pub async fn update_header_settings(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<HeaderSettings>> {
    let patch = json_body(payload)?;
    Ok(Json(state.header_settings.update(&patch).await?))
}

pub async fn reset_header_settings(
    State(state): State<AppState>,
) -> ApiResult<Json<HeaderSettings>> {
    Ok(Json(state.header_settings.reset().await?))
}
