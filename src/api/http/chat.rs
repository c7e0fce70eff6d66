// src/api/http/chat.rs
// Chat dispatch and the legacy OpenRouter passthrough

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::handlers::json_body;
use crate::api::error::{ApiResult, missing_param_error};
use crate::llm::{DispatchRequest, relay_event_stream};
use crate::state::AppState;

/// POST /api/chat: JSON reply, or a relayed SSE stream when `stream` is set
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = json_body(payload)?;

    if request.stream {
        let (provider, upstream) = state.dispatcher.dispatch_stream(&request).await?;
        return Ok(relay_event_stream(provider, upstream));
    }

    let reply = state.dispatcher.dispatch(&request).await?;
    info!(provider = %reply.provider, chars = reply.message.len(), "Chat reply sent");
    Ok(Json(reply).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LegacyAiRequest {
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub model: Option<String>,
}

/// POST /api/ai: forward raw messages to OpenRouter and return its JSON as-is
pub async fn legacy_ai_handler(
    State(state): State<AppState>,
    payload: Result<Json<LegacyAiRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload)?;
    let messages = request
        .messages
        .filter(Value::is_array)
        .ok_or_else(|| missing_param_error("messages"))?;

    let reply = state
        .dispatcher
        .openrouter_passthrough(messages, request.model.as_deref())
        .await?;
    Ok(Json(reply))
}
