// src/client/store.rs
// In-memory chat sessions with optional JSON persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

use super::SessionError;
use crate::llm::{HistoryMessage, ProviderId, Role};
use crate::store::JsonStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            model: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub title: String,
    pub messages: Vec<Message>,
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Transcript in the shape `POST /api/chat` expects
    pub fn history(&self) -> Vec<HistoryMessage> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::Error && !m.content.is_empty())
            .map(|m| HistoryMessage::new(m.role, m.content.clone()))
            .collect()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn message_mut(&mut self, id: Uuid) -> Result<&mut Message, SessionError> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(SessionError::MessageNotFound(id))
    }
}

/// All sessions plus the active one
///
/// Sessions with an open stream are tracked in memory only; a reloaded store
/// starts with none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStore {
    sessions: Vec<ChatSession>,
    current: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
    #[serde(skip)]
    streaming: HashSet<Uuid>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session(&self, id: Uuid) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn session_mut(&mut self, id: Uuid) -> Result<&mut ChatSession, SessionError> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SessionError::NotFound(id))
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.current.and_then(|id| self.session(id))
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// Create a session titled `Chat N` and make it current
    pub fn create_session(&mut self, provider: ProviderId, model: Option<String>) -> Uuid {
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::new_v4(),
            title: format!("Chat {}", self.sessions.len() + 1),
            messages: Vec::new(),
            provider,
            model,
            created_at: now,
            updated_at: now,
        };
        let id = session.id;
        self.sessions.push(session);
        self.current = Some(id);
        info!(session = %id, provider = %provider, "Created chat session");
        id
    }

    pub fn set_current(&mut self, id: Uuid) -> Result<(), SessionError> {
        if self.session(id).is_none() {
            return Err(SessionError::NotFound(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Remove a session; the active reference is cleared if it pointed here
    pub fn delete_session(&mut self, id: Uuid) -> Result<ChatSession, SessionError> {
        let pos = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or(SessionError::NotFound(id))?;
        let removed = self.sessions.remove(pos);
        self.streaming.remove(&id);
        if self.current == Some(id) {
            self.current = None;
        }
        info!(session = %id, "Deleted chat session");
        Ok(removed)
    }

    pub fn add_message(&mut self, session_id: Uuid, message: Message) -> Result<Uuid, SessionError> {
        let session = self.session_mut(session_id)?;
        let id = message.id;
        session.messages.push(message);
        session.touch();
        Ok(id)
    }

    pub fn update_message(
        &mut self,
        session_id: Uuid,
        message_id: Uuid,
        content: impl Into<String>,
    ) -> Result<(), SessionError> {
        let session = self.session_mut(session_id)?;
        session.message_mut(message_id)?.content = content.into();
        session.touch();
        Ok(())
    }

    pub fn delete_message(&mut self, session_id: Uuid, message_id: Uuid) -> Result<(), SessionError> {
        let session = self.session_mut(session_id)?;
        let before = session.messages.len();
        session.messages.retain(|m| m.id != message_id);
        if session.messages.len() == before {
            return Err(SessionError::MessageNotFound(message_id));
        }
        session.touch();
        Ok(())
    }

    pub fn is_streaming(&self, session_id: Uuid) -> bool {
        self.streaming.contains(&session_id)
    }

    /// Open a stream: append an empty assistant message to grow in place
    ///
    /// Refused with `SessionBusy` while another stream is open on the session.
    pub fn begin_stream(&mut self, session_id: Uuid, model: Option<String>) -> Result<Uuid, SessionError> {
        if self.streaming.contains(&session_id) {
            return Err(SessionError::SessionBusy(session_id));
        }
        let mut message = Message::new(Role::Assistant, "");
        message.model = model;
        let id = self.add_message(session_id, message)?;
        self.streaming.insert(session_id);
        debug!(session = %session_id, message = %id, "Stream opened");
        Ok(id)
    }

    /// Append a delta to the streaming message
    pub fn append_delta(
        &mut self,
        session_id: Uuid,
        message_id: Uuid,
        delta: &str,
    ) -> Result<(), SessionError> {
        let session = self.session_mut(session_id)?;
        session.message_mut(message_id)?.content.push_str(delta);
        session.touch();
        Ok(())
    }

    pub fn finish_stream(&mut self, session_id: Uuid) {
        self.streaming.remove(&session_id);
        debug!(session = %session_id, "Stream closed");
    }

    /// Close a failed stream and drop its partial assistant message
    pub fn abort_stream(&mut self, session_id: Uuid, message_id: Uuid, error: impl Into<String>) {
        self.streaming.remove(&session_id);
        if let Ok(session) = self.session_mut(session_id) {
            session.messages.retain(|m| m.id != message_id);
        }
        self.last_error = Some(error.into());
    }
}

/// Sessions persisted as a single JSON document
pub struct SessionFile {
    store: JsonStore<ChatStore>,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    pub async fn load(&self) -> Result<ChatStore, SessionError> {
        Ok(self.store.read().await?.unwrap_or_default())
    }

    pub async fn save(&self, chats: &ChatStore) -> Result<(), SessionError> {
        self.store.write(chats).await?;
        Ok(())
    }
}
