// src/commands/mod.rs
// Slash commands for the code editor assistant

mod handlers;
mod parser;
mod registry;

pub use handlers::CommandEngine;
pub use parser::{FlagValue, ParsedArgs, ParsedCommand, parse_args, parse_command};
pub use registry::{COMMANDS, CommandKind, CommandSpec, instructions, lookup};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command input is empty")]
    EmptyInput,

    #[error("Path '{0}' is outside the workspace")]
    PathOutsideWorkspace(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("No file path given")]
    MissingPath,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: u32,
    pub column: u32,
}

/// The editor buffer a command runs against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPosition>,
}

impl FileContext {
    pub fn for_file(path: &str, content: String) -> Self {
        Self {
            path: path.to_string(),
            content,
            language: language_for(path).to_string(),
            cursor: None,
        }
    }
}

/// Body of `POST /api/commands`
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub input: String,
    #[serde(default)]
    pub context: FileContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileContext>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Generated code or a diff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Prompt to send through chat dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_files(mut self, files: Vec<FileContext>) -> Self {
        self.files = Some(files);
        self
    }
}

/// Editor language id from a file extension
pub fn language_for(path: &str) -> &'static str {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext {
        "rs" => "rust",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "py" => "python",
        "go" => "go",
        "json" => "json",
        "md" => "markdown",
        "css" => "css",
        "html" => "html",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "sh" => "shell",
        _ => "plaintext",
    }
}
