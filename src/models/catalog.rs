//! Built-in model catalogue and OpenRouter listing conversion

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// A selectable model as presented to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_free: bool,
    pub max_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<ModelPricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Price per token, as reported by OpenRouter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub prompt: f64,
    pub completion: f64,
}

fn free_model(id: &str, name: &str, description: &str, max_tokens: u64, context: u64) -> AIModel {
    AIModel {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        is_free: true,
        max_tokens,
        context_window: Some(context),
        pricing: None,
        is_favorite: None,
    }
}

/// Catalogue used when OpenRouter cannot be reached
pub fn default_models() -> Vec<AIModel> {
    vec![
        free_model(
            "google/gemini-1114-experimental",
            "Gemini Experimental 1114",
            "Gemini 11-14 (2024) experimental model features \"quality\" improvements.",
            310_000,
            1_000_000,
        ),
        free_model(
            "liquid/lfm-40b-moe",
            "Liquid: LFM 40B MoE",
            "Liquid's 40.3B Mixture of Experts (MoE) model. Specialized in programming and technology.",
            55_800_000,
            8192,
        ),
        free_model(
            "meta-llama/llama-3.2-3b-instruct",
            "Llama 3.2 3B Instruct",
            "3B parameter multilingual model optimized for dialogue, reasoning, and summarization. Supports 8 languages.",
            37_200_000,
            4096,
        ),
        free_model(
            "meta-llama/llama-3.2-1b-instruct",
            "Llama 3.2 1B Instruct",
            "1B parameter efficient model for summarization and multilingual text analysis.",
            113_000,
            4096,
        ),
        free_model(
            "meta-llama/llama-3.2-90b-vision",
            "Llama 3.2 90B Vision",
            "90B parameter multimodal model for visual reasoning and image-text tasks.",
            39_000,
            4096,
        ),
        free_model(
            "meta-llama/llama-3.2-11b-vision",
            "Llama 3.2 11B Vision",
            "11B parameter multimodal model for image captioning and visual question answering.",
            53_700,
            8192,
        ),
        free_model(
            "google/gemini-flash-8b-1.5-experimental",
            "Gemini Flash 8B 1.5",
            "Experimental 8B parameter version of Gemini 1.5 Flash model.",
            347_000,
            1_000_000,
        ),
        free_model(
            "google/gemini-flash-1.5-experimental",
            "Gemini Flash 1.5",
            "Experimental version of Gemini 1.5 Flash, specialized in technology and web.",
            955_000,
            1_000_000,
        ),
        free_model(
            "nous/hermes-3-405b-instruct",
            "Hermes 3 405B Instruct",
            "Frontier-level model with advanced agentic capabilities, roleplaying, and code generation.",
            1_200_000,
            8192,
        ),
        free_model(
            "google/gemini-pro-1.5-experimental",
            "Gemini Pro 1.5",
            "Bleeding-edge version of Gemini 1.5 Pro with multimodal capabilities.",
            837_000,
            1_000_000,
        ),
    ]
}

/// Convert one entry of OpenRouter's `/api/v1/models` listing
///
/// Returns `None` for entries without an id.
pub fn from_openrouter(entry: &Value) -> Option<AIModel> {
    let id = entry.get("id")?.as_str()?.to_string();

    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| id.rsplit('/').next().unwrap_or(&id).to_string());

    let description = entry
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description available")
        .to_string();

    let context_window = entry.get("context_length").and_then(Value::as_u64);

    let price = |field: &str| -> Option<f64> {
        match entry.pointer(&format!("/pricing/{field}"))? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };
    let pricing = match (price("prompt"), price("completion")) {
        (Some(prompt), Some(completion)) => Some(ModelPricing { prompt, completion }),
        _ => None,
    };
    let is_free = pricing.is_some_and(|p| p.prompt == 0.0 && p.completion == 0.0);

    Some(AIModel {
        id,
        name,
        description,
        is_free,
        max_tokens: context_window.unwrap_or(4096),
        context_window,
        pricing,
        is_favorite: None,
    })
}

/// Merge fetched models into the defaults, sort, and mark favourites
///
/// Defaults win on id collisions. Ordering is free models first, then by
/// case-insensitive name.
pub fn merge_catalogue(fetched: Vec<AIModel>, favorites: &[String]) -> Vec<AIModel> {
    let mut models = default_models();
    let known: HashSet<String> = models.iter().map(|m| m.id.clone()).collect();
    models.extend(fetched.into_iter().filter(|m| !known.contains(&m.id)));

    models.sort_by(|a, b| match (a.is_free, b.is_free) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    });

    mark_favorites(models, favorites)
}

pub(crate) fn mark_favorites(models: Vec<AIModel>, favorites: &[String]) -> Vec<AIModel> {
    models
        .into_iter()
        .map(|mut m| {
            m.is_favorite = Some(favorites.contains(&m.id));
            m
        })
        .collect()
}
