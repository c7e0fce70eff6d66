// src/llm/provider/cohere.rs
// Cohere Generate API provider

use reqwest::RequestBuilder;
use serde_json::{Value, json};

use super::{Provider, UpstreamTarget};
use crate::llm::{ChatTurn, ProviderId};

const MAX_TOKENS: u32 = 500;

pub struct CohereProvider {
    target: UpstreamTarget,
}

impl CohereProvider {
    pub fn new(target: UpstreamTarget) -> Self {
        Self { target }
    }
}

impl Provider for CohereProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Cohere
    }

    fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    fn build_request(&self, turn: &ChatTurn, _stream: bool) -> RequestBuilder {
        let body = json!({
            "prompt": turn.flattened_prompt(),
            "model": turn.model,
            "max_tokens": MAX_TOKENS,
        });

        self.target
            .client
            .post(self.target.url("/v1/generate"))
            .bearer_auth(&self.target.api_key)
            .json(&body)
    }

    fn extract_reply(&self, body: &Value) -> Option<String> {
        body["generations"][0]["text"].as_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::test_support::{request_json, target};

    #[test]
    fn test_request_shape() {
        let turn = ChatTurn {
            message: "Write a haiku".into(),
            history: vec![],
            model: "command".into(),
        };
        let provider = CohereProvider::new(target("http://up"));
        let (request, body) = request_json(provider.build_request(&turn, false));

        assert_eq!(request.url().path(), "/v1/generate");
        assert_eq!(body, json!({"prompt": "Write a haiku", "model": "command", "max_tokens": 500}));
    }

    #[test]
    fn test_extract_reply() {
        let provider = CohereProvider::new(target("http://up"));
        let body = json!({"id": "g1", "generations": [{"id": "x", "text": "Autumn leaves"}]});
        assert_eq!(provider.extract_reply(&body).as_deref(), Some("Autumn leaves"));
    }
}
