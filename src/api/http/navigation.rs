// src/api/http/navigation.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;

use super::handlers::json_body;
use crate::api::error::{ApiResult, missing_param_error};
use crate::navigation::NavItem;
use crate::state::AppState;

pub async fn get_navigation(State(state): State<AppState>) -> ApiResult<Json<Vec<NavItem>>> {
    Ok(Json(state.navigation.items().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest {
    #[serde(default)]
    pub page_name: String,
    #[serde(default)]
    pub show_in_nav: bool,
}

pub async fn set_visibility(
    State(state): State<AppState>,
    payload: Result<Json<VisibilityRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<NavItem>>> {
    let request = json_body(payload)?;
    if request.page_name.trim().is_empty() {
        return Err(missing_param_error("pageName"));
    }
    let items = state
        .navigation
        .set_visibility(&request.page_name, request.show_in_nav)
        .await?;
    Ok(Json(items))
}
