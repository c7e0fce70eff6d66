// src/config/mod.rs
// Server configuration loaded from the environment and the project's .env file

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::llm::ProviderId;

/// Upstream provider calls give up after this long
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    // ── Server
    pub host: String,
    pub port: u16,
    pub cors_origin: String,

    // ── Files
    /// `.env` file holding provider keys; read and rewritten by the settings routes
    pub env_file: PathBuf,
    /// Directory for JSON settings documents
    pub data_dir: PathBuf,
    /// Root of generated pages, one directory per slug
    pub pages_dir: PathBuf,
    /// Directory that AI commands may read and write
    pub workspace_dir: PathBuf,

    // ── Upstream
    pub upstream_timeout: Duration,
    /// Fall back to the process environment when a key is absent from `env_file`
    pub process_env_keys: bool,
    base_urls: HashMap<ProviderId, String>,
}

/// Parse a variable, ignoring trailing `# comments`; unparsable values fall back to the default
fn env_var_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
{
    let Some(val) = lookup(key) else {
        return default;
    };
    let clean_val = val.split('#').next().unwrap_or("").trim();
    match clean_val.parse::<T>() {
        Ok(parsed) => {
            debug!("Config: {} = {} (from environment)", key, clean_val);
            parsed
        }
        Err(_) => {
            warn!("Config: {} = '{}' (parse failed, using default)", key, val);
            default
        }
    }
}

impl ServerConfig {
    /// Load from the process environment, then the `.env` file in the working directory
    ///
    /// The `.env` file is read without exporting it into the process
    /// environment, so keys deleted through the settings API stop resolving.
    pub fn from_env() -> Self {
        let file_vars: HashMap<String, String> = match dotenvy::from_path_iter(".env") {
            Ok(iter) => iter.filter_map(Result::ok).collect(),
            Err(_) => {
                debug!(".env file not found, using environment variables and defaults");
                HashMap::new()
            }
        };

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir: PathBuf = env_var_or(&lookup, "WORKBENCH_DATA_DIR", PathBuf::from("data"));

        let base_urls = ProviderId::ALL
            .iter()
            .filter_map(|id| lookup(&id.base_url_var()).map(|url| (*id, url)))
            .collect();

        Self {
            host: env_var_or(&lookup, "WORKBENCH_HOST", "127.0.0.1".to_string()),
            port: env_var_or(&lookup, "WORKBENCH_PORT", 3001),
            cors_origin: env_var_or(&lookup, "WORKBENCH_CORS_ORIGIN", "*".to_string()),
            env_file: env_var_or(&lookup, "WORKBENCH_ENV_FILE", PathBuf::from(".env")),
            pages_dir: env_var_or(
                &lookup,
                "WORKBENCH_PAGES_DIR",
                PathBuf::from("src/app/(pages)"),
            ),
            workspace_dir: env_var_or(&lookup, "WORKBENCH_WORKSPACE_DIR", PathBuf::from(".")),
            data_dir,
            upstream_timeout: Duration::from_secs(env_var_or(
                &lookup,
                "WORKBENCH_UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )),
            process_env_keys: env_var_or(&lookup, "WORKBENCH_PROCESS_ENV_KEYS", true),
            base_urls,
        }
    }

    /// Self-contained configuration rooted at `root`, used by tests and tooling
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origin: "*".into(),
            env_file: root.join(".env"),
            data_dir: root.join("data"),
            pages_dir: root.join("pages"),
            workspace_dir: root.join("workspace"),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            process_env_keys: false,
            base_urls: HashMap::new(),
        }
    }

    /// Point a provider at a different origin
    pub fn with_base_url(mut self, id: ProviderId, url: impl Into<String>) -> Self {
        self.base_urls.insert(id, url.into());
        self
    }

    /// Upstream origin for a provider
    pub fn base_url(&self, id: ProviderId) -> &str {
        self.base_urls
            .get(&id)
            .map(String::as_str)
            .unwrap_or(id.config().default_base_url)
    }

    pub fn ai_settings_path(&self) -> PathBuf {
        self.data_dir.join("ai-settings.json")
    }

    pub fn header_settings_path(&self) -> PathBuf {
        self.data_dir.join("header-settings.json")
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.data_dir.join("model-favorites.json")
    }

    pub fn nav_config_path(&self) -> PathBuf {
        self.data_dir.join("nav-config.json")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 3001);
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert_eq!(config.env_file, PathBuf::from(".env"));
        assert_eq!(config.base_url(ProviderId::OpenAi), "https://api.openai.com");
        assert!(config.process_env_keys);
    }

    #[test]
    fn test_overrides_and_comments() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("WORKBENCH_PORT", "8080 # dev port"),
            ("WORKBENCH_UPSTREAM_TIMEOUT_SECS", "5"),
            ("MISTRAL_BASE_URL", "http://localhost:9000"),
            ("WORKBENCH_DATA_DIR", "/tmp/wb"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.base_url(ProviderId::Mistral), "http://localhost:9000");
        assert_eq!(config.favorites_path(), PathBuf::from("/tmp/wb/model-favorites.json"));
    }

    #[test]
    fn test_unparsable_value_uses_default() {
        let config = ServerConfig::from_lookup(lookup(&[("WORKBENCH_PORT", "eighty")]));
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn test_rooted_config_never_reads_process_env() {
        let root = Path::new("/srv/wb");
        let config = ServerConfig::rooted_at(root).with_base_url(ProviderId::Cohere, "http://mock");
        assert!(!config.process_env_keys);
        assert_eq!(config.env_file, root.join(".env"));
        assert_eq!(config.base_url(ProviderId::Cohere), "http://mock");
    }
}
