//! `.env` file model
//!
//! Entries keep their original order; comments and blank lines survive a
//! rewrite untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{StoreError, read_optional, write_atomic};

static RE_ENV_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum EnvLine {
    Entry {
        key: String,
        value: String,
        exported: bool,
    },
    Raw(String),
}

/// Reject anything that would not round-trip as one `KEY=value` line
fn validate_entry(key: &str, value: &str) -> Result<(), StoreError> {
    if !RE_ENV_KEY.is_match(key) {
        return Err(StoreError::InvalidEntry(format!("Invalid key name: {key}")));
    }
    if value.contains(['\r', '\n']) {
        return Err(StoreError::InvalidEntry(format!(
            "Value for {key} must be a single line"
        )));
    }
    Ok(())
}

/// Parsed `.env` document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    lines: Vec<EnvLine>,
}

impl EnvFile {
    pub fn parse(content: &str) -> Self {
        let lines = content
            .lines()
            .map(|line| {
                let trimmed = line.trim_start();
                if trimmed.starts_with('#') {
                    return EnvLine::Raw(line.to_string());
                }
                match line.split_once('=') {
                    Some((key, value)) if !key.trim().is_empty() => {
                        let key = key.trim();
                        let (key, exported) = match key.strip_prefix("export ") {
                            Some(rest) => (rest.trim(), true),
                            None => (key, false),
                        };
                        EnvLine::Entry {
                            key: key.to_string(),
                            value: value.trim().to_string(),
                            exported,
                        }
                    }
                    _ => EnvLine::Raw(line.to_string()),
                }
            })
            .collect();
        Self { lines }
    }

    /// Value for `key`, unquoted; the last assignment wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| unquote(v))
            .last()
    }

    /// Keys that carry a non-empty value
    pub fn present_keys(&self) -> BTreeMap<String, bool> {
        self.entries()
            .filter(|(_, v)| !unquote(v).is_empty())
            .map(|(k, _)| (k.to_string(), true))
            .collect()
    }

    /// Set `key`, replacing its first assignment and dropping any later duplicates
    pub fn upsert(&mut self, key: &str, value: &str) {
        let mut seen = false;
        self.lines.retain_mut(|line| match line {
            EnvLine::Entry { key: k, value: v, .. } if k == key => {
                if seen {
                    false
                } else {
                    *v = value.to_string();
                    seen = true;
                    true
                }
            }
            _ => true,
        });

        if !seen {
            self.lines.push(EnvLine::Entry {
                key: key.to_string(),
                value: value.to_string(),
                exported: false,
            });
        }
    }

    /// Remove every assignment of `key`; returns whether anything was removed
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines
            .retain(|line| !matches!(line, EnvLine::Entry { key: k, .. } if k == key));
        before != self.lines.len()
    }

    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(|line| match line {
                EnvLine::Entry {
                    key,
                    value,
                    exported: true,
                } => format!("export {key}={value}"),
                EnvLine::Entry { key, value, .. } => format!("{key}={value}"),
                EnvLine::Raw(raw) => raw.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            EnvLine::Entry { key, value, .. } => Some((key.as_str(), value.as_str())),
            EnvLine::Raw(_) => None,
        })
    }
}

fn unquote(value: &str) -> &str {
    let v = value.trim();
    for quote in ['"', '\''] {
        if v.len() >= 2 && v.starts_with(quote) && v.ends_with(quote) {
            return &v[1..v.len() - 1];
        }
    }
    v
}

/// The managed `.env` file
pub struct EnvFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl EnvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed file; `None` when it does not exist
    pub async fn load(&self) -> Result<Option<EnvFile>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(read_optional(&self.path).await?.map(|c| EnvFile::parse(&c)))
    }

    /// Upsert every non-blank value; the file is created when missing
    ///
    /// Nothing is written when any key name or value is invalid.
    pub async fn save_keys<'a>(
        &self,
        keys: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<usize, StoreError> {
        let keys: Vec<(&str, &str)> = keys
            .into_iter()
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        for (key, value) in &keys {
            if let Err(e) = validate_entry(key, value) {
                warn!("Refusing to save {}: {}", self.path.display(), e);
                return Err(e);
            }
        }

        let _guard = self.lock.lock().await;
        let mut env = read_optional(&self.path)
            .await?
            .map(|c| EnvFile::parse(&c))
            .unwrap_or_default();

        for (key, value) in &keys {
            env.upsert(key, value);
        }
        let written = keys.len();

        write_atomic(&self.path, &env.render()).await?;
        info!("Saved {} key(s) to {}", written, self.path.display());
        Ok(written)
    }

    /// Remove a key; errors with `NotFound` when the file does not exist
    pub async fn delete_key(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let content = read_optional(&self.path)
            .await?
            .ok_or_else(|| StoreError::NotFound(self.path.clone()))?;

        let mut env = EnvFile::parse(&content);
        let removed = env.remove(key.trim());
        write_atomic(&self.path, &env.render()).await?;
        if removed {
            info!("Removed {} from {}", key, self.path.display());
        }
        Ok(removed)
    }
}
