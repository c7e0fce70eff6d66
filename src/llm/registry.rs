//! Static provider registry
//!
//! One entry per supported upstream. Entries are immutable; nothing here is
//! mutated at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported upstream providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    OpenRouter,
    Google,
    Mistral,
    Cohere,
}

/// Request/response envelope family used by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiShape {
    /// `choices[0].message.content`, SSE deltas in `choices[0].delta.content`
    OpenAiCompatible,
    /// `content[0].text`
    Anthropic,
    /// `candidates[0].content.parts[0].text`
    Google,
    /// `generations[0].text`
    Cohere,
}

/// Model entry in a provider's static catalogue
#[derive(Debug, Clone, Serialize)]
pub struct ProviderModel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,
}

/// Static description of a provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub name: &'static str,
    #[serde(rename = "envKey")]
    pub env_key: &'static str,
    /// Additional variable names accepted for the key
    #[serde(skip)]
    pub env_aliases: &'static [&'static str],
    pub description: &'static str,
    #[serde(rename = "defaultModel")]
    pub default_model: &'static str,
    #[serde(skip)]
    pub default_base_url: &'static str,
    pub shape: ApiShape,
    pub models: &'static [ProviderModel],
}

pub static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        id: ProviderId::OpenAi,
        name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        env_aliases: &[],
        description: "GPT-3.5 and GPT-4 models",
        default_model: "gpt-3.5-turbo",
        default_base_url: "https://api.openai.com",
        shape: ApiShape::OpenAiCompatible,
        models: &[
            ProviderModel {
                id: "gpt-3.5-turbo",
                name: "GPT-3.5 Turbo",
                description: "Most capable GPT-3.5 model, optimized for chat",
                max_tokens: 4096,
            },
            ProviderModel {
                id: "gpt-4-turbo-preview",
                name: "GPT-4 Turbo",
                description: "Most capable GPT-4 model, optimized for chat",
                max_tokens: 128_000,
            },
        ],
    },
    ProviderConfig {
        id: ProviderId::Anthropic,
        name: "Anthropic",
        env_key: "ANTHROPIC_API_KEY",
        env_aliases: &[],
        description: "Claude and Claude 2 models",
        default_model: "claude-3-opus-20240229",
        default_base_url: "https://api.anthropic.com",
        shape: ApiShape::Anthropic,
        models: &[
            ProviderModel {
                id: "claude-3-opus-20240229",
                name: "Claude 3 Opus",
                description: "Most capable Claude model",
                max_tokens: 200_000,
            },
            ProviderModel {
                id: "claude-3-sonnet-20240229",
                name: "Claude 3 Sonnet",
                description: "Balanced performance and speed",
                max_tokens: 200_000,
            },
        ],
    },
    ProviderConfig {
        id: ProviderId::OpenRouter,
        name: "Open Router",
        env_key: "OPENROUTER_API_KEY",
        env_aliases: &[],
        description: "Access to multiple AI models",
        default_model: "meta-llama/llama-3.2-90b-vision-instruct:free",
        default_base_url: "https://openrouter.ai",
        shape: ApiShape::OpenAiCompatible,
        models: &[ProviderModel {
            id: "meta-llama/llama-3.2-90b-vision-instruct:free",
            name: "Llama 3.2 90B Vision",
            description: "Free tier of Meta's Llama 3.2 90B Vision model",
            max_tokens: 4096,
        }],
    },
    ProviderConfig {
        id: ProviderId::Google,
        name: "Google AI",
        env_key: "GOOGLE_AI_API_KEY",
        env_aliases: &["GOOGLE_API_KEY"],
        description: "Gemini models",
        default_model: "gemini-pro",
        default_base_url: "https://generativelanguage.googleapis.com",
        shape: ApiShape::Google,
        models: &[
            ProviderModel {
                id: "gemini-pro",
                name: "Gemini Pro",
                description: "Best performance for text-only tasks",
                max_tokens: 32_768,
            },
            ProviderModel {
                id: "gemini-pro-vision",
                name: "Gemini Pro Vision",
                description: "Best performance for text and vision tasks",
                max_tokens: 32_768,
            },
        ],
    },
    ProviderConfig {
        id: ProviderId::Mistral,
        name: "Mistral",
        env_key: "MISTRAL_API_KEY",
        env_aliases: &[],
        description: "Mistral models",
        default_model: "mistral-large-latest",
        default_base_url: "https://api.mistral.ai",
        shape: ApiShape::OpenAiCompatible,
        models: &[
            ProviderModel {
                id: "mistral-large-latest",
                name: "Mistral Large",
                description: "Most capable Mistral model",
                max_tokens: 32_768,
            },
            ProviderModel {
                id: "mistral-medium-latest",
                name: "Mistral Medium",
                description: "Balanced performance and speed",
                max_tokens: 32_768,
            },
            ProviderModel {
                id: "mistral-small-latest",
                name: "Mistral Small",
                description: "Fast and efficient",
                max_tokens: 32_768,
            },
        ],
    },
    ProviderConfig {
        id: ProviderId::Cohere,
        name: "Cohere",
        env_key: "COHERE_API_KEY",
        env_aliases: &[],
        description: "Command and Generate models",
        default_model: "command",
        default_base_url: "https://api.cohere.ai",
        shape: ApiShape::Cohere,
        models: &[
            ProviderModel {
                id: "command",
                name: "Command",
                description: "Best for instruction following and chat",
                max_tokens: 4096,
            },
            ProviderModel {
                id: "generate",
                name: "Generate",
                description: "Best for creative text generation",
                max_tokens: 4096,
            },
        ],
    },
];

impl ProviderId {
    pub const ALL: [ProviderId; 6] = [
        ProviderId::OpenAi,
        ProviderId::Anthropic,
        ProviderId::OpenRouter,
        ProviderId::Google,
        ProviderId::Mistral,
        ProviderId::Cohere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenRouter => "openrouter",
            ProviderId::Google => "google",
            ProviderId::Mistral => "mistral",
            ProviderId::Cohere => "cohere",
        }
    }

    /// Resolve a provider from its id or display name, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim();
        PROVIDERS
            .iter()
            .find(|p| p.id.as_str().eq_ignore_ascii_case(needle) || p.name.eq_ignore_ascii_case(needle))
            .map(|p| p.id)
    }

    pub fn config(&self) -> &'static ProviderConfig {
        // The table holds exactly one entry per variant
        PROVIDERS
            .iter()
            .find(|p| p.id == *self)
            .unwrap_or(&PROVIDERS[0])
    }

    /// Environment variable overriding the upstream origin, e.g. `OPENAI_BASE_URL`
    pub fn base_url_var(&self) -> String {
        format!("{}_BASE_URL", self.as_str().to_uppercase())
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ProviderConfig {
    /// Every variable name under which this provider's key may be stored
    pub fn key_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.env_key).chain(self.env_aliases.iter().copied())
    }
}
