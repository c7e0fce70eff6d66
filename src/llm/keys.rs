//! Provider API key resolution

use std::sync::Arc;
use tracing::warn;

use super::ProviderConfig;
use crate::store::EnvFileStore;

/// Looks keys up in the managed `.env` file first, then the process environment
///
/// The file is re-read on every lookup so keys saved through the settings API
/// take effect without a restart.
#[derive(Clone)]
pub struct ApiKeyResolver {
    env_file: Arc<EnvFileStore>,
    process_env: bool,
}

impl ApiKeyResolver {
    pub fn new(env_file: Arc<EnvFileStore>, process_env: bool) -> Self {
        Self {
            env_file,
            process_env,
        }
    }

    /// Resolve the key for a provider; blank values count as missing
    pub async fn resolve(&self, provider: &ProviderConfig) -> Option<String> {
        let env = match self.env_file.load().await {
            Ok(env) => env,
            Err(e) => {
                warn!("Could not read {}: {}", self.env_file.path().display(), e);
                None
            }
        };

        for name in provider.key_names() {
            let from_file = env.as_ref().and_then(|f| f.get(name)).and_then(non_blank);
            if let Some(key) = from_file {
                return Some(key);
            }
            if let Some(key) = self.process_lookup(name) {
                return Some(key);
            }
        }
        None
    }

    fn process_lookup(&self, name: &str) -> Option<String> {
        if !self.process_env {
            return None;
        }
        std::env::var(name).ok().as_deref().and_then(non_blank)
    }

    /// Whether a key is configured, without exposing it
    pub async fn is_configured(&self, provider: &ProviderConfig) -> bool {
        self.resolve(provider).await.is_some()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
