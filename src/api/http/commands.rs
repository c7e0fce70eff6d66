// src/api/http/commands.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use super::handlers::json_body;
use crate::api::error::ApiResult;
use crate::commands::{CommandRequest, CommandResult};
use crate::state::AppState;

/// POST /api/commands: run one slash command against the workspace
///
/// Unknown commands come back as `success: false` with a 200; malformed
/// input and paths outside the workspace are 4xx.
pub async fn execute_command(
    State(state): State<AppState>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> ApiResult<Json<CommandResult>> {
    let request = json_body(payload)?;
    let result = state
        .commands
        .execute(&request.input, &request.context)
        .await?;
    Ok(Json(result))
}
