// src/llm/provider/openai.rs
// OpenAI-compatible Chat Completions providers (OpenAI, OpenRouter, Mistral)

use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;

use super::{Provider, UpstreamTarget};
use crate::llm::{ChatTurn, ProviderId, Role};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

/// Provider speaking the Chat Completions wire format
pub struct OpenAiCompatibleProvider {
    id: ProviderId,
    target: UpstreamTarget,
}

impl OpenAiCompatibleProvider {
    pub fn new(id: ProviderId, target: UpstreamTarget) -> Self {
        Self { id, target }
    }

    fn completions_path(&self) -> &'static str {
        match self.id {
            ProviderId::OpenRouter => "/api/v1/chat/completions",
            _ => "/v1/chat/completions",
        }
    }

    fn build_messages(turn: &ChatTurn) -> Vec<ChatMessage<'_>> {
        turn.upstream_history()
            .map(|m| ChatMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .chain(std::iter::once(ChatMessage {
                role: Role::User.as_str(),
                content: &turn.message,
            }))
            .collect()
    }
}

impl Provider for OpenAiCompatibleProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    fn build_request(&self, turn: &ChatTurn, stream: bool) -> RequestBuilder {
        let body = ChatCompletionRequest {
            model: &turn.model,
            messages: Self::build_messages(turn),
            stream,
        };

        let mut request = self
            .target
            .client
            .post(self.target.url(self.completions_path()))
            .bearer_auth(&self.target.api_key)
            .json(&body);

        if self.id == ProviderId::OpenRouter {
            request = request
                .header("HTTP-Referer", "http://localhost:3000")
                .header("X-Title", "Workbench");
        }
        request
    }

    fn extract_reply(&self, body: &Value) -> Option<String> {
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::HistoryMessage;
    use crate::llm::provider::test_support::{request_json, target};
    use serde_json::json;

    fn turn() -> ChatTurn {
        ChatTurn {
            message: "How are you?".into(),
            history: vec![
                HistoryMessage::new(Role::System, "Be brief."),
                HistoryMessage::new(Role::User, "Hi"),
                HistoryMessage::new(Role::Assistant, "Hello!"),
                HistoryMessage::new(Role::Error, "Failed to send message"),
            ],
            model: "gpt-3.5-turbo".into(),
        }
    }

    #[test]
    fn test_request_shape() {
        let provider = OpenAiCompatibleProvider::new(ProviderId::OpenAi, target("http://up"));
        let (request, body) = request_json(provider.build_request(&turn(), false));

        assert_eq!(request.url().as_str(), "http://up/v1/chat/completions");
        assert_eq!(
            request.headers()["authorization"].to_str().unwrap(),
            "Bearer test-key"
        );
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert!(body.get("stream").is_none());

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], json!({"role": "system", "content": "Be brief."}));
        assert_eq!(messages[3], json!({"role": "user", "content": "How are you?"}));
    }

    #[test]
    fn test_openrouter_path_and_headers() {
        let provider = OpenAiCompatibleProvider::new(ProviderId::OpenRouter, target("http://up"));
        let (request, body) = request_json(provider.build_request(&turn(), true));

        assert_eq!(request.url().path(), "/api/v1/chat/completions");
        assert!(request.headers().contains_key("x-title"));
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_extract_reply() {
        let provider = OpenAiCompatibleProvider::new(ProviderId::Mistral, target("http://up"));
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "Fine."}}]});
        assert_eq!(provider.extract_reply(&body).as_deref(), Some("Fine."));
        assert_eq!(provider.extract_reply(&json!({"choices": []})), None);
    }
}
