// src/navigation.rs
// Site navigation items persisted in nav-config.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::store::{JsonStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub name: String,
    pub href: String,
    pub show_in_nav: bool,
}

impl NavItem {
    fn new(name: &str, href: &str) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            show_in_nav: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavConfig {
    pub items: Vec<NavItem>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            items: vec![
                NavItem::new("Home", "/home"),
                NavItem::new("Dashboard", "/dashboard"),
                NavItem::new("About", "/about"),
                NavItem::new("Pages", "/pages"),
            ],
        }
    }
}

/// Route for a page name: `/` followed by the lowercased name
pub fn page_href(page_name: &str) -> String {
    format!("/{}", page_name.trim().to_lowercase())
}

pub struct NavigationStore {
    store: JsonStore<NavConfig>,
}

impl NavigationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    /// Items in display order; the file is created with defaults when missing
    pub async fn items(&self) -> Result<Vec<NavItem>, StoreError> {
        Ok(self.store.load_or_init(NavConfig::default).await?.items)
    }

    /// Show or hide a page
    ///
    /// An unknown page is appended when it should be shown and ignored
    /// otherwise.
    pub async fn set_visibility(
        &self,
        page_name: &str,
        show_in_nav: bool,
    ) -> Result<Vec<NavItem>, StoreError> {
        let href = page_href(page_name);
        let (config, _) = self
            .store
            .update(NavConfig::default, |config| {
                match config.items.iter_mut().find(|item| item.href == href) {
                    Some(item) => item.show_in_nav = show_in_nav,
                    None if show_in_nav => config.items.push(NavItem {
                        name: page_name.trim().to_string(),
                        href: href.clone(),
                        show_in_nav: true,
                    }),
                    None => {}
                }
            })
            .await?;

        info!(href = %href, show_in_nav, "Navigation updated");
        Ok(config.items)
    }
}
