//! AI settings document (`ai-settings.json`)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;

use super::SettingsError;
use crate::store::JsonStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub anthropic_api_key: String,
    #[serde(default, rename = "openRouterApiKey")]
    pub openrouter_api_key: String,
    #[serde(default)]
    pub google_api_key: String,
    #[serde(default)]
    pub mistral_api_key: String,
    #[serde(default)]
    pub cohere_api_key: String,
    /// Fields written by newer clients are kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".into(),
            system_prompt: "You are a helpful assistant.".into(),
            openai_api_key: String::new(),
            anthropic_api_key: String::new(),
            openrouter_api_key: String::new(),
            google_api_key: String::new(),
            mistral_api_key: String::new(),
            cohere_api_key: String::new(),
            extra: Map::new(),
        }
    }
}

impl AiSettings {
    /// Required fields present and key formats plausible
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.model.trim().is_empty() || self.system_prompt.trim().is_empty() {
            return Err(SettingsError::Invalid("Missing required fields".into()));
        }

        let prefixed = [
            (&self.openai_api_key, "sk-", "OpenAI"),
            (&self.anthropic_api_key, "sk-ant-", "Anthropic"),
            (&self.openrouter_api_key, "sk-or-", "Open Router"),
        ];
        for (key, prefix, provider) in prefixed {
            if !key.is_empty() && !key.starts_with(prefix) {
                return Err(SettingsError::Invalid(format!(
                    "Invalid {provider} API key format"
                )));
            }
        }
        Ok(())
    }
}

pub struct AiSettingsStore {
    store: JsonStore<AiSettings>,
}

impl AiSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    /// Current settings, writing defaults when the file is missing
    pub async fn load(&self) -> Result<AiSettings, SettingsError> {
        Ok(self.store.load_or_init(AiSettings::default).await?)
    }

    /// Validate and replace the document
    pub async fn save(&self, settings: &AiSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.store.write(settings).await?;
        info!(model = %settings.model, "AI settings saved");
        Ok(())
    }
}
