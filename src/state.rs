// src/state.rs
// Shared application state handed to every HTTP handler

use std::sync::Arc;
use tracing::info;

use crate::commands::CommandEngine;
use crate::config::ServerConfig;
use crate::llm::{ApiKeyResolver, DispatchError, Dispatcher};
use crate::models::FavoritesStore;
use crate::navigation::NavigationStore;
use crate::pages::PageStore;
use crate::settings::{AiSettingsStore, HeaderSettingsStore};
use crate::store::EnvFileStore;

/// Cheap to clone; every store serialises its own writers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub dispatcher: Arc<Dispatcher>,
    pub env_file: Arc<EnvFileStore>,
    pub ai_settings: Arc<AiSettingsStore>,
    pub header_settings: Arc<HeaderSettingsStore>,
    pub favorites: Arc<FavoritesStore>,
    pub navigation: Arc<NavigationStore>,
    pub pages: Arc<PageStore>,
    pub commands: Arc<CommandEngine>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, DispatchError> {
        let config = Arc::new(config);
        let env_file = Arc::new(EnvFileStore::new(&config.env_file));
        let keys = ApiKeyResolver::new(env_file.clone(), config.process_env_keys);
        let dispatcher = Arc::new(Dispatcher::new(config.clone(), keys)?);

        info!(
            env_file = %config.env_file.display(),
            data_dir = %config.data_dir.display(),
            pages_dir = %config.pages_dir.display(),
            "Application state initialised"
        );

        Ok(Self {
            dispatcher,
            env_file,
            ai_settings: Arc::new(AiSettingsStore::new(config.ai_settings_path())),
            header_settings: Arc::new(HeaderSettingsStore::new(config.header_settings_path())),
            favorites: Arc::new(FavoritesStore::new(config.favorites_path())),
            navigation: Arc::new(NavigationStore::new(config.nav_config_path())),
            pages: Arc::new(PageStore::new(&config.pages_dir)),
            commands: Arc::new(CommandEngine::new(&config.workspace_dir)),
            config,
        })
    }
}
