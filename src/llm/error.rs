//! Dispatch error taxonomy

use axum::http::StatusCode;
use thiserror::Error;

use super::ProviderId;

/// Everything that can go wrong between receiving a chat request and
/// returning the provider's reply. None of these are retried.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Invalid provider: {0}")]
    UnknownProvider(String),

    #[error("{0} API key not configured")]
    MissingApiKey(ProviderId),

    #[error("Streaming is not supported for provider {0}")]
    StreamingUnsupported(ProviderId),

    #[error("Upstream provider timed out")]
    Timeout,

    #[error("Upstream provider rate limit exceeded")]
    RateLimited,

    #[error("Upstream provider error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Non-2xx passed through with its original status (legacy passthrough)
    #[error("API request failed: {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Malformed upstream response from {0}")]
    MalformedReply(ProviderId),
}

impl DispatchError {
    /// Map an upstream non-2xx status onto the error taxonomy
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => DispatchError::Timeout,
            StatusCode::TOO_MANY_REQUESTS => DispatchError::RateLimited,
            other => DispatchError::Upstream {
                status: other.as_u16(),
                message: preview(body),
            },
        }
    }

    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchError::Timeout
        } else {
            DispatchError::Transport(err.to_string())
        }
    }

    /// HTTP status surfaced to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::EmptyMessage
            | DispatchError::UnknownProvider(_)
            | DispatchError::MissingApiKey(_)
            | DispatchError::StreamingUnsupported(_) => StatusCode::BAD_REQUEST,
            DispatchError::Timeout => StatusCode::REQUEST_TIMEOUT,
            DispatchError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            DispatchError::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            DispatchError::Upstream { .. }
            | DispatchError::Transport(_)
            | DispatchError::MalformedReply(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the JSON error body
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::EmptyMessage => "MISSING_MESSAGE",
            DispatchError::UnknownProvider(_) => "INVALID_PROVIDER",
            DispatchError::MissingApiKey(_) => "MISSING_API_KEY",
            DispatchError::StreamingUnsupported(_) => "STREAMING_UNSUPPORTED",
            DispatchError::Timeout => "UPSTREAM_TIMEOUT",
            DispatchError::RateLimited => "RATE_LIMITED",
            DispatchError::Upstream { .. } | DispatchError::Rejected { .. } => "UPSTREAM_ERROR",
            DispatchError::Transport(_) => "UPSTREAM_UNREACHABLE",
            DispatchError::MalformedReply(_) => "MALFORMED_UPSTREAM_RESPONSE",
        }
    }
}

/// First 200 characters of an upstream error body
fn preview(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DispatchError::from_status(StatusCode::GATEWAY_TIMEOUT, "").status(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            DispatchError::from_status(StatusCode::REQUEST_TIMEOUT, "").status(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            DispatchError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down").status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            DispatchError::from_status(StatusCode::UNAUTHORIZED, "bad key").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DispatchError::from_status(StatusCode::BAD_GATEWAY, "").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_key_names_provider() {
        let err = DispatchError::MissingApiKey(ProviderId::Cohere);
        assert_eq!(err.to_string(), "cohere API key not configured");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rejected_keeps_upstream_status() {
        let err = DispatchError::Rejected {
            status: 402,
            reason: "Payment Required".into(),
        };
        assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.to_string(), "API request failed: Payment Required");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);
    }
}
