//! Command execution against a workspace directory

use ignore::gitignore::Gitignore;
use once_cell::sync::Lazy;
use regex::Regex;
use similar::TextDiff;
use std::path::{Component, Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::parser::{ParsedArgs, parse_args, parse_command};
use super::registry::{self, CommandKind};
use super::{CommandError, CommandResult, FileContext, language_for};

/// Undo history depth
const MAX_HISTORY: usize = 50;

static RE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(import\s|use\s|from\s+\S+\s+import\s|#include\s|const\s+\w+\s*=\s*require\()")
        .expect("valid regex")
});
static RE_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\b(?:fn|function|def|func)\s+([A-Za-z_]\w*)|\b(?:const|let)\s+([A-Za-z_]\w*)\s*=\s*(?:async\s*)?\([^)]*\)\s*=>")
        .expect("valid regex")
});

/// A write that `/undo` can revert; `previous: None` means the file was created
#[derive(Debug, Clone)]
struct FileChange {
    path: String,
    previous: Option<String>,
}

pub struct CommandEngine {
    workspace: PathBuf,
    history: Mutex<Vec<FileChange>>,
}

impl CommandEngine {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Parse and run one command line
    pub async fn execute(
        &self,
        input: &str,
        context: &FileContext,
    ) -> Result<CommandResult, CommandError> {
        let parsed = parse_command(input).ok_or(CommandError::EmptyInput)?;
        let Some(spec) = registry::lookup(&parsed.command).filter(|_| parsed.command.starts_with('/'))
        else {
            debug!("Unknown command: {}", parsed.command);
            return Ok(CommandResult::failed(
                format!("Unknown command: {}", parsed.command),
                "Unknown command",
            ));
        };

        info!(command = spec.command, args = parsed.args.len(), "Executing command");
        let args = &parsed.args;
        match spec.kind {
            CommandKind::Help => Ok(help(args)),
            CommandKind::Analyze => self.analyze(&parse_args(args), context).await,
            CommandKind::List => self.list(&parse_args(args)),
            CommandKind::Modify => self.modify(&parse_args(args), context).await,
            CommandKind::Undo => self.undo().await,
            CommandKind::Save => self.save(args, context).await,
            CommandKind::Preview => self.preview(context).await,
            CommandKind::Generate => Ok(generate(args, context)),
            CommandKind::Explain => Ok(explain(args, context)),
            CommandKind::Apply => Ok(apply(args)),
        }
    }

    /// Resolve a workspace-relative path, refusing anything that climbs out
    fn resolve(&self, relative: &str) -> Result<PathBuf, CommandError> {
        let path = Path::new(relative.trim());
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(CommandError::PathOutsideWorkspace(relative.to_string()));
        }
        Ok(self.workspace.join(path))
    }

    async fn record(&self, change: FileChange) {
        let mut history = self.history.lock().await;
        history.push(change);
        if history.len() > MAX_HISTORY {
            history.remove(0);
        }
    }

    async fn read_if_exists(path: &Path) -> Result<Option<String>, CommandError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write `content` to a workspace file, recording the old content for undo
    async fn write_tracked(&self, relative: &str, content: &str) -> Result<bool, CommandError> {
        let path = self.resolve(relative)?;
        let previous = Self::read_if_exists(&path).await?;
        let created = previous.is_none();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        self.record(FileChange {
            path: relative.to_string(),
            previous,
        })
        .await;
        Ok(created)
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    async fn analyze(
        &self,
        args: &ParsedArgs,
        context: &FileContext,
    ) -> Result<CommandResult, CommandError> {
        let deep = args.has("d");
        let target = args.path.clone().or_else(|| args.value("d").map(str::to_string));

        let file = match target {
            Some(relative) if relative != context.path => {
                let path = self.resolve(&relative)?;
                if path.is_dir() {
                    let count = WalkDir::new(&path)
                        .into_iter()
                        .filter_map(|e| e.ok())
                        .filter(|e| e.file_type().is_file())
                        .count();
                    return Ok(CommandResult::ok(format!(
                        "Analysis complete\nDirectory: {relative}\nFiles: {count}"
                    )));
                }
                let content = Self::read_if_exists(&path)
                    .await?
                    .ok_or_else(|| CommandError::NotFound(relative.clone()))?;
                FileContext::for_file(&relative, content)
            }
            _ => context.clone(),
        };

        let language = if file.language.is_empty() {
            language_for(&file.path).to_string()
        } else {
            file.language.clone()
        };
        let functions: Vec<&str> = RE_FUNCTION
            .captures_iter(&file.content)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str())
            .collect();

        let mut message = format!(
            "Analysis complete\nFile: {}\nLanguage: {}\nLines: {}\nImports: {}\nFunctions: {}",
            if file.path.is_empty() { "(buffer)" } else { file.path.as_str() },
            language,
            file.content.lines().count(),
            RE_IMPORT.find_iter(&file.content).count(),
            functions.len(),
        );
        if deep && !functions.is_empty() {
            message.push_str("\n\nFunctions:\n");
            message.push_str(
                &functions
                    .iter()
                    .map(|f| format!("- {f}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }

        Ok(CommandResult::ok(message).with_files(vec![file]))
    }

    fn list(&self, args: &ParsedArgs) -> Result<CommandResult, CommandError> {
        let recursive = args.has("r");
        let relative = args
            .path
            .clone()
            .or_else(|| args.value("r").map(str::to_string))
            .unwrap_or_else(|| ".".to_string());
        let root = self.resolve(&relative)?;
        if !root.is_dir() {
            return Err(CommandError::NotFound(relative));
        }

        let gitignore_path = self.workspace.join(".gitignore");
        let gitignore = if recursive && gitignore_path.exists() {
            Gitignore::new(&gitignore_path).0
        } else {
            Gitignore::empty()
        };

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .follow_links(false)
            .sort_by_file_name();

        let mut entries = Vec::new();
        let mut iter = walker.into_iter();
        while let Some(entry) = iter.next() {
            let Ok(entry) = entry else { continue };
            let is_dir = entry.file_type().is_dir();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if recursive && (hidden || gitignore.matched(entry.path(), is_dir).is_ignore()) {
                if is_dir {
                    iter.skip_current_dir();
                }
                continue;
            }

            let shown = entry
                .path()
                .strip_prefix(&self.workspace)
                .unwrap_or(entry.path())
                .display()
                .to_string();
            entries.push(if is_dir { format!("{shown}/") } else { shown });
        }

        let files = entries
            .iter()
            .filter(|e| !e.ends_with('/'))
            .map(|e| FileContext {
                path: e.clone(),
                language: language_for(e).to_string(),
                ..Default::default()
            })
            .collect();

        Ok(CommandResult::ok(format!(
            "Files listed successfully ({} entries)\n{}",
            entries.len(),
            entries.join("\n")
        ))
        .with_files(files))
    }

    async fn modify(
        &self,
        args: &ParsedArgs,
        context: &FileContext,
    ) -> Result<CommandResult, CommandError> {
        let create = args.has("c");
        let relative = args
            .path
            .clone()
            .or_else(|| args.value("c").map(str::to_string))
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| context.path.clone());
        if relative.trim().is_empty() {
            return Err(CommandError::MissingPath);
        }

        if !create && !self.resolve(&relative)?.is_file() {
            return Err(CommandError::NotFound(relative));
        }

        let created = self.write_tracked(&relative, &context.content).await?;
        info!(path = %relative, created, "File written by command");

        let message = if created {
            "File created successfully"
        } else {
            "File modified successfully"
        };
        Ok(CommandResult::ok(message).with_files(vec![FileContext::for_file(
            &relative,
            context.content.clone(),
        )]))
    }

    async fn undo(&self) -> Result<CommandResult, CommandError> {
        let Some(change) = self.history.lock().await.pop() else {
            return Ok(CommandResult {
                success: false,
                message: "No changes to undo".into(),
                ..Default::default()
            });
        };

        let path = self.resolve(&change.path)?;
        let restored = match &change.previous {
            Some(previous) => {
                tokio::fs::write(&path, previous).await?;
                previous.clone()
            }
            None => {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                String::new()
            }
        };

        info!(path = %change.path, "Change undone");
        Ok(
            CommandResult::ok("Last change undone successfully")
                .with_files(vec![FileContext::for_file(&change.path, restored)]),
        )
    }

    async fn save(
        &self,
        args: &[String],
        context: &FileContext,
    ) -> Result<CommandResult, CommandError> {
        if context.path.trim().is_empty() {
            return Err(CommandError::MissingPath);
        }
        self.write_tracked(&context.path, &context.content).await?;

        let note = args.join(" ");
        let message = if note.is_empty() {
            "Changes saved".to_string()
        } else {
            format!("Changes saved: {note}")
        };
        Ok(CommandResult::ok(message).with_files(vec![context.clone()]))
    }

    async fn preview(&self, context: &FileContext) -> Result<CommandResult, CommandError> {
        if context.path.trim().is_empty() {
            return Err(CommandError::MissingPath);
        }
        let on_disk = Self::read_if_exists(&self.resolve(&context.path)?).await?;
        let old = on_disk.as_deref().unwrap_or("");

        if old == context.content {
            return Ok(CommandResult::ok("No changes"));
        }

        let diff = TextDiff::from_lines(old, context.content.as_str());
        let old_header = if on_disk.is_some() {
            format!("a/{}", context.path)
        } else {
            "/dev/null".to_string()
        };
        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header(&old_header, &format!("b/{}", context.path))
            .to_string();

        Ok(CommandResult {
            code: Some(unified),
            ..CommandResult::ok("Preview generated")
        })
    }
}

fn help(args: &[String]) -> CommandResult {
    match args.first().and_then(|name| registry::lookup(name)) {
        Some(spec) => CommandResult::ok(spec.describe()),
        None => CommandResult::ok(registry::instructions(false)),
    }
}

fn generate(args: &[String], context: &FileContext) -> CommandResult {
    let (kind, description) = match args.split_first() {
        Some((kind, rest)) if !rest.is_empty() => (kind, rest.join(" ")),
        _ => {
            return CommandResult::failed(
                "Please provide both a type and description. Example: /generate component \"A button with loading state\"",
                "Invalid arguments",
            );
        }
    };

    let language = if context.language.is_empty() {
        "typescript"
    } else {
        context.language.as_str()
    };
    let mut prompt = format!(
        "Generate a {kind} in {language}.\n\nRequirements: {description}\n\nReturn only the code in a single fenced block."
    );
    if !context.content.trim().is_empty() {
        prompt.push_str(&format!(
            "\n\nIt will be added to {}:\n```{language}\n{}\n```",
            if context.path.is_empty() { "the current file" } else { context.path.as_str() },
            context.content
        ));
    }

    CommandResult {
        prompt: Some(prompt),
        ..CommandResult::ok(format!("Generated {kind} prompt based on your description"))
    }
}

fn explain(args: &[String], context: &FileContext) -> CommandResult {
    let target = args.first().map(String::as_str).unwrap_or("current");
    let language = if context.language.is_empty() {
        language_for(&context.path)
    } else {
        context.language.as_str()
    };

    let prompt = format!(
        "Explain the {target} code below. Describe what it does, how the pieces fit together and anything surprising.\n\n```{language}\n{}\n```",
        context.content
    );
    CommandResult {
        prompt: Some(prompt),
        ..CommandResult::ok(format!("Explanation of {target} code requested"))
    }
}

fn apply(args: &[String]) -> CommandResult {
    let placement = if args.iter().any(|a| a == "-r") {
        "replacing entire file"
    } else if args.iter().any(|a| a == "cursor") {
        "at cursor position"
    } else {
        "at appropriate location"
    };
    CommandResult::ok(format!("Code applied {placement}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine() -> (TempDir, CommandEngine) {
        let dir = TempDir::new().unwrap();
        let engine = CommandEngine::new(dir.path());
        (dir, engine)
    }

    fn buffer(path: &str, content: &str) -> FileContext {
        FileContext::for_file(path, content.to_string())
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (_dir, engine) = engine();
        let result = engine.execute("/deploy now", &FileContext::default()).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unknown command"));

        let result = engine.execute("help", &FileContext::default()).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_empty_input_is_error() {
        let (_dir, engine) = engine();
        assert!(matches!(
            engine.execute("  ", &FileContext::default()).await,
            Err(CommandError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_help_single_command() {
        let (_dir, engine) = engine();
        let result = engine.execute("/help modify", &FileContext::default()).await.unwrap();
        assert!(result.message.starts_with("Command: /modify"));

        let result = engine.execute("/help", &FileContext::default()).await.unwrap();
        assert!(result.message.starts_with("Available commands:"));
    }

    #[tokio::test]
    async fn test_analyze_buffer() {
        let (_dir, engine) = engine();
        let ctx = buffer(
            "src/util.ts",
            "import fs from 'fs';\nimport path from 'path';\n\nexport function read() {}\nconst write = async (x) => x;\n",
        );
        let result = engine.execute("/analyze -d", &ctx).await.unwrap();
        assert!(result.message.contains("Language: typescript"));
        assert!(result.message.contains("Imports: 2"));
        assert!(result.message.contains("Functions: 2"));
        assert!(result.message.contains("- write"));
    }

    #[tokio::test]
    async fn test_modify_requires_create_flag_for_new_files() {
        let (dir, engine) = engine();
        let ctx = buffer("notes.md", "# Notes\n");

        assert!(matches!(
            engine.execute("/modify", &ctx).await,
            Err(CommandError::NotFound(_))
        ));

        let result = engine.execute("/modify -c", &ctx).await.unwrap();
        assert_eq!(result.message, "File created successfully");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("notes.md")).unwrap(),
            "# Notes\n"
        );
    }

    #[tokio::test]
    async fn test_modify_then_undo_restores_previous() {
        let (dir, engine) = engine();
        std::fs::write(dir.path().join("a.rs"), "fn old() {}\n").unwrap();

        engine
            .execute("/modify a.rs", &buffer("a.rs", "fn new() {}\n"))
            .await
            .unwrap();
        let result = engine.execute("/undo", &FileContext::default()).await.unwrap();
        assert!(result.success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.rs")).unwrap(),
            "fn old() {}\n"
        );

        let result = engine.execute("/undo", &FileContext::default()).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "No changes to undo");
    }

    #[tokio::test]
    async fn test_undo_of_created_file_removes_it() {
        let (dir, engine) = engine();
        engine
            .execute("/modify new/file.txt -c", &buffer("", "hello"))
            .await
            .unwrap();
        assert!(dir.path().join("new/file.txt").exists());

        engine.execute("/undo", &FileContext::default()).await.unwrap();
        assert!(!dir.path().join("new/file.txt").exists());
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_workspace() {
        let (_dir, engine) = engine();
        assert!(matches!(
            engine.execute("/modify ../evil.sh -c", &buffer("", "x")).await,
            Err(CommandError::PathOutsideWorkspace(_))
        ));
        assert!(matches!(
            engine.execute("/list /etc", &FileContext::default()).await,
            Err(CommandError::PathOutsideWorkspace(_))
        ));
    }

    #[tokio::test]
    async fn test_list_recursive_respects_gitignore() {
        let (dir, engine) = engine();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::create_dir_all(dir.path().join("target")).unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "").unwrap();
        std::fs::write(dir.path().join("src/nested/deep.rs"), "").unwrap();
        std::fs::write(dir.path().join("target/out.bin"), "").unwrap();

        let flat = engine.execute("/list", &FileContext::default()).await.unwrap();
        assert!(flat.message.contains("src/"));
        assert!(!flat.message.contains("main.rs"));

        let deep = engine.execute("/list -r", &FileContext::default()).await.unwrap();
        let paths: Vec<String> = deep.files.unwrap().into_iter().map(|f| f.path).collect();
        assert!(paths.contains(&"src/main.rs".to_string()));
        assert!(paths.contains(&"src/nested/deep.rs".to_string()));
        assert!(!paths.iter().any(|p| p.starts_with("target")));
        assert!(!paths.iter().any(|p| p.starts_with(".gitignore")));
    }

    #[tokio::test]
    async fn test_preview_shows_unified_diff() {
        let (dir, engine) = engine();
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();

        let result = engine
            .execute("/preview", &buffer("a.txt", "one\nthree\n"))
            .await
            .unwrap();
        let diff = result.code.unwrap();
        assert!(diff.contains("--- a/a.txt"));
        assert!(diff.contains("-two"));
        assert!(diff.contains("+three"));

        let unchanged = engine
            .execute("/preview", &buffer("a.txt", "one\ntwo\n"))
            .await
            .unwrap();
        assert_eq!(unchanged.message, "No changes");
    }

    #[tokio::test]
    async fn test_save_writes_buffer() {
        let (dir, engine) = engine();
        let result = engine
            .execute("/save \"tidy imports\"", &buffer("lib.rs", "pub fn x() {}\n"))
            .await
            .unwrap();
        assert_eq!(result.message, "Changes saved: tidy imports");
        assert!(dir.path().join("lib.rs").exists());
    }

    #[tokio::test]
    async fn test_generate_requires_type_and_description() {
        let (_dir, engine) = engine();
        let result = engine.execute("/generate component", &FileContext::default()).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid arguments"));

        let result = engine
            .execute("/generate hook \"track window size\"", &FileContext::default())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.prompt.unwrap().contains("Requirements: track window size"));
    }

    #[tokio::test]
    async fn test_explain_and_apply() {
        let (_dir, engine) = engine();
        let result = engine
            .execute("/explain", &buffer("x.py", "def f(): pass"))
            .await
            .unwrap();
        assert!(result.prompt.unwrap().contains("```python\ndef f(): pass"));

        let result = engine.execute("/apply cursor", &FileContext::default()).await.unwrap();
        assert_eq!(result.message, "Code applied at cursor position");
        let result = engine.execute("/apply -r", &FileContext::default()).await.unwrap();
        assert_eq!(result.message, "Code applied replacing entire file");
    }
}
