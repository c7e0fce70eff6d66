// src/models/mod.rs
// Model catalogue and favourite models

mod catalog;
mod favorites;

pub use catalog::{AIModel, ModelPricing, default_models, from_openrouter, merge_catalogue};
pub use favorites::{FavoritesData, FavoritesStore};
