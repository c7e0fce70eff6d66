// src/api/http/pages.rs
// Generated page CRUD

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};

use super::handlers::json_body;
use crate::api::error::ApiResult;
use crate::pages::{PageContent, PageInfo};
use crate::state::AppState;

pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Json<Vec<PageInfo>>> {
    Ok(Json(state.pages.list().await?))
}

pub async fn create_page(
    State(state): State<AppState>,
    payload: Result<Json<PageContent>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let page = json_body(payload)?;
    let slug = state.pages.create(&page).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "route": format!("/{slug}"),
            "slug": slug,
        })),
    ))
}

pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PageContent>> {
    Ok(Json(state.pages.read(&slug).await?))
}

pub async fn update_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<Json<PageContent>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let page = json_body(payload)?;
    state.pages.update(&slug, &page).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn delete_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    state.pages.delete(&slug).await?;
    Ok(Json(json!({ "success": true })))
}
