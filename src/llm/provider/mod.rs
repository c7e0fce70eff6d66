//! Provider abstraction for upstream chat APIs
//!
//! Each provider knows how to shape a request for its API and where the reply
//! text lives in the response envelope. Sending, timeouts and error mapping are
//! shared.

mod claude;
mod cohere;
mod gemini;
mod openai;

pub use claude::ClaudeProvider;
pub use cohere::CohereProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatibleProvider;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{ApiShape, ChatTurn, DispatchError, ProviderId};

/// Everything a provider needs to reach its upstream
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub client: HttpClient,
    pub api_key: String,
    /// Origin without trailing slash, e.g. `https://api.openai.com`
    pub base_url: String,
    pub timeout: Duration,
}

impl UpstreamTarget {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Unified provider trait for upstream chat backends
#[async_trait]
pub trait Provider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn target(&self) -> &UpstreamTarget;

    /// Build the HTTP request for a conversation turn
    fn build_request(&self, turn: &ChatTurn, stream: bool) -> RequestBuilder;

    /// Pull the assistant text out of a successful response envelope
    fn extract_reply(&self, body: &Value) -> Option<String>;

    fn supports_streaming(&self) -> bool {
        false
    }

    /// Non-streaming completion, returns the assistant text
    async fn complete(&self, turn: &ChatTurn) -> Result<String, DispatchError> {
        let timeout = self.target().timeout;
        let request = self.build_request(turn, false);

        let body = tokio::time::timeout(timeout, async {
            let response = send(request).await?;
            response
                .json::<Value>()
                .await
                .map_err(DispatchError::from_transport)
        })
        .await
        .map_err(|_| DispatchError::Timeout)??;

        debug!(provider = %self.id(), "Upstream reply received");
        self.extract_reply(&body)
            .ok_or(DispatchError::MalformedReply(self.id()))
    }

    /// Streaming completion, returns the upstream response once headers arrive
    ///
    /// The timeout covers connection and headers only; the body is relayed for
    /// as long as the upstream keeps it open.
    async fn stream(&self, turn: &ChatTurn) -> Result<Response, DispatchError> {
        if !self.supports_streaming() {
            return Err(DispatchError::StreamingUnsupported(self.id()));
        }
        let request = self.build_request(turn, true);
        tokio::time::timeout(self.target().timeout, send(request))
            .await
            .map_err(|_| DispatchError::Timeout)?
    }
}

/// Send a request and turn transport failures and non-2xx statuses into errors
pub async fn send(request: RequestBuilder) -> Result<Response, DispatchError> {
    let response = request.send().await.map_err(DispatchError::from_transport)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DispatchError::from_status(status, &body))
}

/// Instantiate the provider implementation for a registry entry
pub fn build_provider(id: ProviderId, target: UpstreamTarget) -> Box<dyn Provider> {
    match id.config().shape {
        ApiShape::OpenAiCompatible => Box::new(OpenAiCompatibleProvider::new(id, target)),
        ApiShape::Anthropic => Box::new(ClaudeProvider::new(target)),
        ApiShape::Google => Box::new(GeminiProvider::new(target)),
        ApiShape::Cohere => Box::new(CohereProvider::new(target)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn target(base_url: &str) -> UpstreamTarget {
        UpstreamTarget {
            client: HttpClient::new(),
            api_key: "test-key".into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Decode the JSON body a request builder would send
    pub fn request_json(builder: RequestBuilder) -> (reqwest::Request, Value) {
        let request = builder.build().unwrap();
        let bytes = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| b.to_vec())
            .unwrap_or_default();
        let json = serde_json::from_slice(&bytes).unwrap();
        (request, json)
    }
}
