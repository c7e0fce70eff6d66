// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::commands::CommandError;
use crate::llm::DispatchError;
use crate::pages::PageError;
use crate::settings::SettingsError;
use crate::store::StoreError;

/// Standard API error response format
///
/// Every error leaves the server as `{ "error": <message>, "code": <code>, "status": <u16> }`.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    /// Create a new internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error_code: Some("INTERNAL_ERROR".to_string()),
        }
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
            error_code: Some("BAD_REQUEST".to_string()),
        }
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::NOT_FOUND,
            error_code: Some("NOT_FOUND".to_string()),
        }
    }

    /// Create a new error with a specific status code and error code
    pub fn with_code(status_code: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(code.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["code"] = json!(error_code);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Domain error conversions
// ============================================================================

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            error!("Chat dispatch failed: {}", err);
        }
        ApiError::with_code(status, err.code(), err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => {
                ApiError::not_found(format!("No {} file found", display_name(&path)))
            }
            StoreError::InvalidEntry(message) => ApiError::bad_request(message),
            other => {
                error!("Settings store failure: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::NotFound(slug) => ApiError::not_found(format!("Page '{slug}' not found")),
            PageError::InvalidTitle(_) | PageError::InvalidSlug(_) => {
                ApiError::bad_request(err.to_string())
            }
            PageError::Io { op, source } => fs_error(&format!("page {op}"), source),
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Io(e) => fs_error("command execution", e),
            CommandError::NotFound(path) => ApiError::not_found(format!("File not found: {path}")),
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Invalid(message) => ApiError::bad_request(message),
            SettingsError::Store(e) => e.into(),
        }
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Helper function for file system operation errors
pub fn fs_error(operation: &str, error: impl std::fmt::Debug) -> ApiError {
    let message = format!("File system error during {operation}");
    error!("{}: {:?}", message, error);
    ApiError::internal(message)
}

/// Helper function for missing parameter errors
pub fn missing_param_error(param_name: &str) -> ApiError {
    ApiError::bad_request(format!("Missing required parameter: {param_name}"))
}
