//! Header appearance settings (`header-settings.json`)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use super::SettingsError;
use crate::store::JsonStore;

/// Tailwind class choices and toggles for the site header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderSettings {
    pub background_color: String,
    pub text_color: String,
    pub font_size: String,
    pub height: String,
    pub custom_height: String,
    pub max_width: String,
    pub padding: String,
    pub is_sticky: bool,
    pub show_shadow: bool,
    pub is_boxed: bool,
    pub content_alignment: String,
    pub border_bottom: bool,
    pub border_color: String,
    pub opacity: u8,
    pub blur: bool,
    pub blur_strength: String,
    pub logo_position: String,
    pub nav_alignment: String,
    pub nav_spacing: String,
    pub nav_padding: String,
    pub nav_style: String,
    pub nav_hover_effect: String,
    pub nav_rounded: String,
    pub nav_button_variant: String,
    pub nav_button_spacing: String,
    pub nav_button_padding: String,
    pub nav_container_position: String,
    pub nav_container_height: String,
    pub header_content_position: String,
    pub header_content_height: String,
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            background_color: "bg-white dark:bg-gray-800".into(),
            text_color: "text-gray-900 dark:text-white".into(),
            font_size: "text-base".into(),
            height: "h-16".into(),
            custom_height: "64".into(),
            max_width: "max-w-7xl".into(),
            padding: "px-4".into(),
            is_sticky: true,
            show_shadow: true,
            is_boxed: false,
            content_alignment: "justify-between".into(),
            border_bottom: false,
            border_color: "border-gray-200 dark:border-gray-700".into(),
            opacity: 100,
            blur: false,
            blur_strength: "backdrop-blur-sm".into(),
            logo_position: "start".into(),
            nav_alignment: "center".into(),
            nav_spacing: "space-x-4".into(),
            nav_padding: "px-4".into(),
            nav_style: "default".into(),
            nav_hover_effect: "hover:bg-gray-100 dark:hover:bg-gray-700".into(),
            nav_rounded: "rounded-md".into(),
            nav_button_variant: "ghost".into(),
            nav_button_spacing: "space-x-2".into(),
            nav_button_padding: "px-4 py-2".into(),
            nav_container_position: "items-center".into(),
            nav_container_height: "h-full".into(),
            header_content_position: "items-center".into(),
            header_content_height: "h-full".into(),
        }
    }
}

impl HeaderSettings {
    /// Shallow-merge a partial JSON object over these settings
    ///
    /// Unknown keys are ignored; a known key with the wrong type is rejected.
    pub fn merged(&self, patch: &Value) -> Result<Self, SettingsError> {
        let Value::Object(patch) = patch else {
            return Err(SettingsError::Invalid(
                "Header settings patch must be a JSON object".into(),
            ));
        };

        let mut current = serde_json::to_value(self)
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        if let Value::Object(fields) = &mut current {
            for (key, value) in patch {
                if fields.contains_key(key) {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }

        serde_json::from_value(current)
            .map_err(|e| SettingsError::Invalid(format!("Invalid header settings: {e}")))
    }
}

pub struct HeaderSettingsStore {
    store: JsonStore<HeaderSettings>,
}

impl HeaderSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    /// Stored settings, or the defaults when nothing has been saved
    pub async fn load(&self) -> Result<HeaderSettings, SettingsError> {
        Ok(self.store.read().await?.unwrap_or_default())
    }

    pub async fn update(&self, patch: &Value) -> Result<HeaderSettings, SettingsError> {
        // Type errors do not depend on the stored values, so reject before locking
        HeaderSettings::default().merged(patch)?;

        let (next, _) = self
            .store
            .update(HeaderSettings::default, |doc| {
                if let Ok(merged) = doc.merged(patch) {
                    *doc = merged;
                }
            })
            .await?;
        info!("Header settings updated");
        Ok(next)
    }

    pub async fn reset(&self) -> Result<HeaderSettings, SettingsError> {
        let defaults = HeaderSettings::default();
        self.store.write(&defaults).await?;
        info!("Header settings reset to defaults");
        Ok(defaults)
    }
}
