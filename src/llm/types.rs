//! Conversation types shared by dispatch and the client store

use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    /// Local error notice shown in the transcript; never sent upstream
    Error,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Error => "error",
        }
    }
}

/// Prior message as sent by the UI
///
/// Clients post whole transcript entries; only `role` and `content` matter here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One resolved conversation turn, ready for a provider
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub message: String,
    pub history: Vec<HistoryMessage>,
    pub model: String,
}

impl ChatTurn {
    /// History with local error notices removed
    pub fn upstream_history(&self) -> impl Iterator<Item = &HistoryMessage> {
        self.history.iter().filter(|m| m.role != Role::Error)
    }

    /// History contents followed by the new message, newline-joined
    ///
    /// Used by providers that take a single prompt instead of a message list.
    pub fn flattened_prompt(&self) -> String {
        self.upstream_history()
            .map(|m| m.content.as_str())
            .chain(std::iter::once(self.message.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
