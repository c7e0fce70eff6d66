// src/api/http/handlers.rs
// Service-level handlers and shared request helpers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::api::error::{ApiError, ApiResult};
use crate::llm::{PROVIDERS, ProviderConfig};
use crate::state::AppState;

/// Unwrap a JSON body, turning extractor rejections into JSON 400s
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text())))
}

/// Health check handler
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    #[serde(flatten)]
    pub provider: &'static ProviderConfig,
    pub configured: bool,
}

/// Provider registry with key presence (never key values)
pub async fn providers_handler(State(state): State<AppState>) -> Json<Value> {
    let mut providers = Vec::with_capacity(PROVIDERS.len());
    for provider in PROVIDERS {
        providers.push(ProviderStatus {
            provider,
            configured: state.dispatcher.keys().is_configured(provider).await,
        });
    }
    Json(json!({ "providers": providers }))
}
