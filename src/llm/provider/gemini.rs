// src/llm/provider/gemini.rs
// Google Generative Language API provider (generateContent)

use reqwest::RequestBuilder;
use serde_json::{Value, json};

use super::{Provider, UpstreamTarget};
use crate::llm::{ChatTurn, ProviderId};

pub struct GeminiProvider {
    target: UpstreamTarget,
}

impl GeminiProvider {
    pub fn new(target: UpstreamTarget) -> Self {
        Self { target }
    }
}

impl Provider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    fn build_request(&self, turn: &ChatTurn, _stream: bool) -> RequestBuilder {
        // The whole conversation travels as a single text part
        let body = json!({
            "contents": [
                { "parts": [ { "text": turn.flattened_prompt() } ] }
            ]
        });

        let path = format!("/v1/models/{}:generateContent", turn.model);
        self.target
            .client
            .post(self.target.url(&path))
            .query(&[("key", self.target.api_key.as_str())])
            .json(&body)
    }

    fn extract_reply(&self, body: &Value) -> Option<String> {
        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
    }
}
