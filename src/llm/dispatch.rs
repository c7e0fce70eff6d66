//! Provider-agnostic chat dispatch
//!
//! Validates an incoming chat request, resolves the provider and its key,
//! and forwards the turn upstream. One attempt per request: no retry, no
//! backoff.

use reqwest::{Client as HttpClient, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::provider::{Provider, UpstreamTarget, build_provider, send};
use super::{ApiKeyResolver, ChatTurn, DispatchError, HistoryMessage, ProviderId};
use crate::config::ServerConfig;

/// Default model for the legacy OpenRouter passthrough
pub const LEGACY_DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DispatchRequest {
    pub message: String,
    pub provider: String,
    pub history: Vec<HistoryMessage>,
    pub model: Option<String>,
    pub stream: bool,
}

/// Normalised non-streaming reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub provider: ProviderId,
    pub model: String,
}

pub struct Dispatcher {
    client: HttpClient,
    keys: ApiKeyResolver,
    config: Arc<ServerConfig>,
}

impl Dispatcher {
    pub fn new(config: Arc<ServerConfig>, keys: ApiKeyResolver) -> Result<Self, DispatchError> {
        let client = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("workbench/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DispatchError::from_transport)?;

        Ok(Self {
            client,
            keys,
            config,
        })
    }

    pub fn keys(&self) -> &ApiKeyResolver {
        &self.keys
    }

    /// Validate a request and resolve everything needed to send it
    pub async fn prepare(
        &self,
        request: &DispatchRequest,
    ) -> Result<(Box<dyn Provider>, ChatTurn), DispatchError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(DispatchError::EmptyMessage);
        }

        let id = ProviderId::parse(&request.provider)
            .ok_or_else(|| DispatchError::UnknownProvider(request.provider.clone()))?;
        let provider = self.provider(id).await?;

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(id.config().default_model)
            .to_string();

        let turn = ChatTurn {
            message: message.to_string(),
            history: request.history.clone(),
            model,
        };
        Ok((provider, turn))
    }

    /// Provider instance bound to its resolved key and upstream origin
    pub async fn provider(&self, id: ProviderId) -> Result<Box<dyn Provider>, DispatchError> {
        let target = self.target(id).await?;
        Ok(build_provider(id, target))
    }

    /// Send a turn and return the normalised reply
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<ChatReply, DispatchError> {
        let (provider, turn) = self.prepare(request).await?;
        info!(
            provider = %provider.id(),
            model = %turn.model,
            history = turn.history.len(),
            "Dispatching chat request"
        );

        let message = provider.complete(&turn).await?;
        Ok(ChatReply {
            message,
            provider: provider.id(),
            model: turn.model,
        })
    }

    /// Send a streaming turn; the upstream response is returned once headers arrive
    pub async fn dispatch_stream(
        &self,
        request: &DispatchRequest,
    ) -> Result<(ProviderId, Response), DispatchError> {
        let (provider, turn) = self.prepare(request).await?;
        info!(
            provider = %provider.id(),
            model = %turn.model,
            "Dispatching streaming chat request"
        );
        let response = provider.stream(&turn).await?;
        Ok((provider.id(), response))
    }

    /// Forward raw chat messages to OpenRouter and return its JSON verbatim
    pub async fn openrouter_passthrough(
        &self,
        messages: Value,
        model: Option<&str>,
    ) -> Result<Value, DispatchError> {
        let target = self.target(ProviderId::OpenRouter).await?;
        let body = json!({
            "model": model.filter(|m| !m.trim().is_empty()).unwrap_or(LEGACY_DEFAULT_MODEL),
            "messages": messages,
        });

        let request = target
            .client
            .post(target.url("/api/v1/chat/completions"))
            .bearer_auth(&target.api_key)
            .header("HTTP-Referer", "http://localhost:3000")
            .header("X-Title", "Code Editor AI Assistant")
            .json(&body);

        let response = tokio::time::timeout(target.timeout, request.send())
            .await
            .map_err(|_| DispatchError::Timeout)?
            .map_err(DispatchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response.json().await.map_err(DispatchError::from_transport)
    }

    /// OpenRouter model listing (`data` array); works without a key
    pub async fn openrouter_models(&self) -> Result<Vec<Value>, DispatchError> {
        let provider = ProviderId::OpenRouter.config();
        let mut request = self
            .client
            .get(format!(
                "{}/api/v1/models",
                self.config.base_url(ProviderId::OpenRouter).trim_end_matches('/')
            ))
            .timeout(self.config.upstream_timeout);
        if let Some(key) = self.keys.resolve(provider).await {
            request = request.bearer_auth(key);
        }

        let body: Value = send(request)
            .await?
            .json()
            .await
            .map_err(DispatchError::from_transport)?;

        match body.get("data").and_then(Value::as_array) {
            Some(models) => Ok(models.clone()),
            None => {
                warn!("OpenRouter model listing had no data array");
                Err(DispatchError::MalformedReply(ProviderId::OpenRouter))
            }
        }
    }

    async fn target(&self, id: ProviderId) -> Result<UpstreamTarget, DispatchError> {
        let api_key = self
            .keys
            .resolve(id.config())
            .await
            .ok_or(DispatchError::MissingApiKey(id))?;

        Ok(UpstreamTarget {
            client: self.client.clone(),
            api_key,
            base_url: self.config.base_url(id).to_string(),
            timeout: self.config.upstream_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::store::EnvFileStore;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher(dir: &TempDir, env: &str, config: ServerConfig) -> Dispatcher {
        let env_path = dir.path().join(".env");
        std::fs::write(&env_path, env).unwrap();
        let keys = ApiKeyResolver::new(Arc::new(EnvFileStore::new(env_path)), false);
        Dispatcher::new(Arc::new(config), keys).unwrap()
    }

    fn request(provider: &str, message: &str) -> DispatchRequest {
        DispatchRequest {
            message: message.into(),
            provider: provider.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected_before_provider_lookup() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir, "", ServerConfig::rooted_at(dir.path()));
        let err = d.dispatch(&request("nonsense", "   ")).await.unwrap_err();
        assert!(matches!(err, DispatchError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir, "", ServerConfig::rooted_at(dir.path()));
        let err = d.dispatch(&request("llama", "hi")).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownProvider(p) if p == "llama"));
    }

    #[tokio::test]
    async fn test_missing_key_names_provider() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir, "OPENAI_API_KEY=sk-1\n", ServerConfig::rooted_at(dir.path()));
        let err = d.dispatch(&request("anthropic", "hi")).await.unwrap_err();
        assert!(matches!(err, DispatchError::MissingApiKey(ProviderId::Anthropic)));
        assert!(err.to_string().contains("anthropic"));
    }

    #[tokio::test]
    async fn test_prepare_defaults_model_and_trims_message() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir, "MISTRAL_API_KEY=m\n", ServerConfig::rooted_at(dir.path()));
        let (provider, turn) = d.prepare(&request("Mistral", "  hello  ")).await.unwrap();
        assert_eq!(provider.id(), ProviderId::Mistral);
        assert_eq!(turn.model, "mistral-large-latest");
        assert_eq!(turn.message, "hello");
    }

    #[tokio::test]
    async fn test_dispatch_openai_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Hello there"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config =
            ServerConfig::rooted_at(dir.path()).with_base_url(ProviderId::OpenAi, server.uri());
        let d = dispatcher(&dir, "OPENAI_API_KEY=sk-test\n", config);

        let mut req = request("openai", "Hi");
        req.history = vec![HistoryMessage::new(Role::User, "earlier")];
        let reply = d.dispatch(&req).await.unwrap();
        assert_eq!(reply.message, "Hello there");
        assert_eq!(reply.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_upstream_rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config =
            ServerConfig::rooted_at(dir.path()).with_base_url(ProviderId::Cohere, server.uri());
        let d = dispatcher(&dir, "COHERE_API_KEY=co\n", config);

        let err = d.dispatch(&request("cohere", "hi")).await.unwrap_err();
        assert!(matches!(err, DispatchError::RateLimited));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(800))
                    .set_body_json(json!({"content": [{"text": "late"}]})),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut config =
            ServerConfig::rooted_at(dir.path()).with_base_url(ProviderId::Anthropic, server.uri());
        config.upstream_timeout = Duration::from_millis(100);
        let d = dispatcher(&dir, "ANTHROPIC_API_KEY=sk-ant-1\n", config);

        let err = d.dispatch(&request("anthropic", "hi")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Timeout));
    }

    #[tokio::test]
    async fn test_passthrough_propagates_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(402))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config =
            ServerConfig::rooted_at(dir.path()).with_base_url(ProviderId::OpenRouter, server.uri());
        let d = dispatcher(&dir, "OPENROUTER_API_KEY=sk-or-1\n", config);

        let err = d
            .openrouter_passthrough(json!([{"role": "user", "content": "hi"}]), None)
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 402);
    }
}
