//! Generated pages, one `page.tsx` component per slug directory
//!
//! The component file is the only storage: title and content are read back
//! by pattern-matching the generated markup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

const PAGE_FILE: &str = "page.tsx";

static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"h1[^>]*>([^<]+)<").expect("valid regex"));
static RE_GENERATED_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div className="prose dark:prose-invert">\n {10}(.*)\n {8}</div>\n {6}</div>"#)
        .expect("valid regex")
});
static RE_LOOSE_CONTENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"prose[^>]*>([^<]+)<").expect("valid regex"));
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Page '{0}' not found")]
    NotFound(String),

    #[error("Invalid page title: {0}")]
    InvalidTitle(String),

    #[error("Invalid page slug: {0}")]
    InvalidSlug(String),

    #[error("Page {op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl PageError {
    /// I/O failure tagged with the page operation (`list`, `read`, ...)
    fn io(op: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| PageError::Io { op, source }
    }
}

/// Title and body of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Directory listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub name: String,
    pub path: String,
    pub route: String,
}

/// Lowercased title with whitespace runs collapsed to `-`
pub fn slugify(title: &str) -> String {
    RE_WHITESPACE
        .replace_all(title.trim(), "-")
        .to_lowercase()
}

fn component_name(title: &str) -> String {
    let mut name = String::new();
    for word in title.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    if name.is_empty() || name.starts_with(|c: char| c.is_numeric()) {
        name.insert_str(0, "Generated");
    }
    format!("{name}Page")
}

/// Component source for a page
pub fn render_page(title: &str, content: &str) -> String {
    format!(
        r#"export default function {component}() {{
  return (
    <div className="min-h-screen p-8">
      <div className="max-w-4xl mx-auto">
        <h1 className="text-3xl font-bold mb-6">{title}</h1>
        <div className="prose dark:prose-invert">
          {content}
        </div>
      </div>
    </div>
  );
}}
"#,
        component = component_name(title),
    )
}

/// Recover title and content from a component file
pub fn parse_page(source: &str) -> PageContent {
    let title = RE_TITLE
        .captures(source)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    let content = RE_GENERATED_CONTENT
        .captures(source)
        .or_else(|| RE_LOOSE_CONTENT.captures(source))
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    PageContent { title, content }
}

fn validate_title(title: &str) -> Result<String, PageError> {
    let title = title.trim();
    if title.is_empty() || title.contains(['<', '>', '{', '}']) {
        return Err(PageError::InvalidTitle(title.to_string()));
    }
    Ok(title.to_string())
}

/// A slug must name exactly one directory below the pages root
fn validate_slug(slug: &str) -> Result<(), PageError> {
    let mut components = Path::new(slug).components();
    let single_dir = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_dir || slug.contains(['/', '\\']) {
        return Err(PageError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct PageStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn page_file(&self, slug: &str) -> PathBuf {
        self.root.join(slug).join(PAGE_FILE)
    }

    /// Page directories, excluding the page manager itself (`pages*`)
    pub async fn list(&self) -> Result<Vec<PageInfo>, PageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PageError::io("list")(e)),
        };

        let mut pages = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(PageError::io("list"))? {
            if !entry.file_type().await.map_err(PageError::io("list"))?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with("pages") {
                continue;
            }
            pages.push(PageInfo {
                name: capitalize(&name),
                path: entry.path().display().to_string(),
                route: format!("/{name}"),
            });
        }
        pages.sort_by(|a, b| a.route.cmp(&b.route));
        Ok(pages)
    }

    /// Write a new page; returns its slug. An existing page with the same
    /// slug is overwritten.
    pub async fn create(&self, page: &PageContent) -> Result<String, PageError> {
        let title = validate_title(&page.title)?;
        let slug = slugify(&title);
        validate_slug(&slug)?;

        let _guard = self.lock.lock().await;
        let file = self.page_file(&slug);
        if let Some(dir) = file.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(PageError::io("write"))?;
        }
        tokio::fs::write(&file, render_page(&title, &page.content))
            .await
            .map_err(PageError::io("write"))?;

        info!(slug = %slug, "Page created");
        Ok(slug)
    }

    pub async fn read(&self, slug: &str) -> Result<PageContent, PageError> {
        validate_slug(slug)?;
        match tokio::fs::read_to_string(self.page_file(slug)).await {
            Ok(source) => Ok(parse_page(&source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PageError::NotFound(slug.to_string()))
            }
            Err(e) => Err(PageError::io("read")(e)),
        }
    }

    /// Regenerate an existing page in place; the slug does not change
    pub async fn update(&self, slug: &str, page: &PageContent) -> Result<(), PageError> {
        validate_slug(slug)?;
        let title = validate_title(&page.title)?;

        let _guard = self.lock.lock().await;
        let file = self.page_file(slug);
        let exists = tokio::fs::try_exists(&file)
            .await
            .map_err(PageError::io("write"))?;
        if !exists {
            return Err(PageError::NotFound(slug.to_string()));
        }
        tokio::fs::write(&file, render_page(&title, &page.content))
            .await
            .map_err(PageError::io("write"))?;

        info!(slug = %slug, "Page updated");
        Ok(())
    }

    pub async fn delete(&self, slug: &str) -> Result<(), PageError> {
        validate_slug(slug)?;

        let _guard = self.lock.lock().await;
        let dir = self.root.join(slug);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!(slug = %slug, "Page deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No page directory at {}", dir.display());
                Err(PageError::NotFound(slug.to_string()))
            }
            Err(e) => Err(PageError::io("delete")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(title: &str, content: &str) -> PageContent {
        PageContent {
            title: title.into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Foo Bar"), "foo-bar");
        assert_eq!(slugify("  Many   Spaces\tHere "), "many-spaces-here");
    }

    #[test]
    fn test_component_name() {
        assert_eq!(component_name("Foo Bar"), "FooBarPage");
        assert_eq!(component_name("2024 plans"), "Generated2024PlansPage");
        assert_eq!(component_name("it's-done"), "ItSDonePage");
    }

    #[test]
    fn test_render_then_parse() {
        let source = render_page("Release Notes", "Line one.\n<p>Line <b>two</b></p>");
        let parsed = parse_page(&source);
        assert_eq!(parsed.title, "Release Notes");
        assert_eq!(parsed.content, "Line one.\n<p>Line <b>two</b></p>");
    }

    #[test]
    fn test_parse_handwritten_page() {
        let parsed = parse_page(r#"<h1 className="x">Hand</h1><div className="prose">Body text</div>"#);
        assert_eq!(parsed.title, "Hand");
        assert_eq!(parsed.content, "Body text");
    }

    #[tokio::test]
    async fn test_create_read_update_delete() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());

        let slug = store.create(&page("Foo Bar", "Hello")).await.unwrap();
        assert_eq!(slug, "foo-bar");
        assert_eq!(store.read("foo-bar").await.unwrap(), page("Foo Bar", "Hello"));

        store.update("foo-bar", &page("Foo Baz", "Changed")).await.unwrap();
        assert_eq!(store.read("foo-bar").await.unwrap().title, "Foo Baz");

        store.delete("foo-bar").await.unwrap();
        assert!(matches!(store.read("foo-bar").await, Err(PageError::NotFound(_))));
        assert!(matches!(store.delete("foo-bar").await, Err(PageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        assert!(matches!(
            store.update("ghost", &page("Ghost", "")).await,
            Err(PageError::NotFound(_))
        ));
        assert!(!dir.path().join("ghost").exists());
    }

    #[tokio::test]
    async fn test_rejects_unsafe_input() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());

        assert!(matches!(
            store.create(&page("<script>", "")).await,
            Err(PageError::InvalidTitle(_))
        ));
        assert!(matches!(
            store.create(&page("   ", "")).await,
            Err(PageError::InvalidTitle(_))
        ));
        assert!(matches!(
            store.create(&page("a/../b", "")).await,
            Err(PageError::InvalidSlug(_))
        ));
        assert!(matches!(store.read("..").await, Err(PageError::InvalidSlug(_))));
    }

    #[tokio::test]
    async fn test_dot_slug_never_reaches_pages_root() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        store.create(&page("About", "")).await.unwrap();

        for slug in [".", "./", "a/", "a/b", ""] {
            assert!(
                matches!(validate_slug(slug), Err(PageError::InvalidSlug(_))),
                "{slug:?} should be rejected"
            );
        }
        assert!(matches!(
            store.create(&page(".", "")).await,
            Err(PageError::InvalidSlug(_))
        ));
        assert!(matches!(store.delete(".").await, Err(PageError::InvalidSlug(_))));
        assert!(matches!(
            store.update(".", &page("Dot", "")).await,
            Err(PageError::InvalidSlug(_))
        ));

        assert!(!dir.path().join("page.tsx").exists());
        assert!(dir.path().join("about/page.tsx").exists());
    }

    #[tokio::test]
    async fn test_list_skips_page_manager() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        store.create(&page("About", "")).await.unwrap();
        std::fs::create_dir_all(dir.path().join("pages/edit")).unwrap();
        std::fs::write(dir.path().join("stray.txt"), "").unwrap();

        let pages = store.list().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].name, "About");
        assert_eq!(pages[0].route, "/about");
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
    }
}
