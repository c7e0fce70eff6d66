// src/llm/provider/claude.rs
// Anthropic Messages API provider

use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;

use super::{Provider, UpstreamTarget};
use crate::llm::{ChatTurn, ProviderId, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ClaudeMessage<'a>>,
}

pub struct ClaudeProvider {
    target: UpstreamTarget,
}

impl ClaudeProvider {
    pub fn new(target: UpstreamTarget) -> Self {
        Self { target }
    }

    fn build_body(turn: &ChatTurn) -> MessagesRequest<'_> {
        // Messages API only takes user/assistant turns; system text moves to the top level
        let system: Vec<&str> = turn
            .upstream_history()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let messages = turn
            .upstream_history()
            .filter(|m| m.role != Role::System)
            .map(|m| ClaudeMessage {
                role: if m.role == Role::Assistant { "assistant" } else { "user" },
                content: &m.content,
            })
            .chain(std::iter::once(ClaudeMessage {
                role: "user",
                content: &turn.message,
            }))
            .collect();

        MessagesRequest {
            model: &turn.model,
            max_tokens: MAX_TOKENS,
            system: (!system.is_empty()).then(|| system.join("\n")),
            messages,
        }
    }
}

impl Provider for ClaudeProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    fn build_request(&self, turn: &ChatTurn, _stream: bool) -> RequestBuilder {
        self.target
            .client
            .post(self.target.url("/v1/messages"))
            .header("x-api-key", &self.target.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&Self::build_body(turn))
    }

    fn extract_reply(&self, body: &Value) -> Option<String> {
        body["content"][0]["text"].as_str().map(str::to_string)
    }
}
