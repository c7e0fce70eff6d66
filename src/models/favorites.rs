//! Favourite model ids, persisted as `{ "models": [...] }`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::store::{JsonStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesData {
    pub models: Vec<String>,
}

pub struct FavoritesStore {
    store: JsonStore<FavoritesData>,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    /// Current favourites; the file is created empty when missing
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.store.load_or_init(FavoritesData::default).await?.models)
    }

    /// Add or remove `model_id`; returns whether it is now a favourite
    pub async fn toggle(&self, model_id: &str) -> Result<bool, StoreError> {
        let (_, now_favorite) = self
            .store
            .update(FavoritesData::default, |data| {
                if let Some(pos) = data.models.iter().position(|m| m == model_id) {
                    data.models.remove(pos);
                    false
                } else {
                    data.models.push(model_id.to_string());
                    true
                }
            })
            .await?;

        info!(model = model_id, favorite = now_favorite, "Toggled favourite");
        Ok(now_favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_initialises_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model-favorites.json");
        let store = FavoritesStore::new(&path);

        assert!(store.list().await.unwrap().is_empty());
        let raw: FavoritesData =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, FavoritesData::default());
    }

    #[tokio::test]
    async fn test_double_toggle_restores_list() {
        let dir = TempDir::new().unwrap();
        let store = FavoritesStore::new(dir.path().join("model-favorites.json"));
        store.toggle("a/one").await.unwrap();
        store.toggle("b/two").await.unwrap();
        let before = store.list().await.unwrap();

        assert!(store.toggle("c/three").await.unwrap());
        assert!(!store.toggle("c/three").await.unwrap());
        assert_eq!(store.list().await.unwrap(), before);
    }
}
