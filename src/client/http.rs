// src/client/http.rs
// HTTP client for the chat endpoint, feeding replies into a ChatStore

use anyhow::{Context, Result, anyhow};
use futures::StreamExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::SessionError;
use super::store::{ChatStore, Message};
use crate::llm::{ApiShape, Role, SseDecoder};

/// `<data dir>/workbench/sessions.json`, falling back to the working directory
pub fn default_sessions_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("workbench"))
        .unwrap_or_else(|| PathBuf::from(".workbench"))
        .join("sessions.json")
}

pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Send `text` on a session and collect the reply into the store
    ///
    /// Streaming providers grow the assistant message delta by delta and
    /// `on_delta` sees each piece; others fill it in one go. On failure the
    /// partial reply is removed and the error is recorded on the store.
    pub async fn send(
        &self,
        chats: &mut ChatStore,
        session_id: Uuid,
        text: &str,
        mut on_delta: impl FnMut(&str),
    ) -> Result<String> {
        let session = chats
            .session(session_id)
            .ok_or_else(|| anyhow!("Chat session {session_id} not found"))?;
        let provider = session.provider;
        let model = session.model.clone();
        let history = session.history();
        let stream = provider.config().shape == ApiShape::OpenAiCompatible;

        // Refuse before touching the transcript so a busy session keeps no orphan prompt
        if chats.is_streaming(session_id) {
            return Err(SessionError::SessionBusy(session_id).into());
        }
        chats.add_message(session_id, Message::new(Role::User, text))?;
        let reply_id = chats.begin_stream(session_id, model.clone())?;
        chats.set_error(None);

        let body = json!({
            "message": text,
            "provider": provider,
            "history": history,
            "model": model,
            "stream": stream,
        });

        let outcome = self
            .exchange(&body, stream, |delta| {
                on_delta(delta);
                chats.append_delta(session_id, reply_id, delta)
            })
            .await;

        match outcome {
            Ok(Some(full)) => {
                chats.update_message(session_id, reply_id, full)?;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(session = %session_id, "Chat request failed: {:#}", e);
                chats.abort_stream(session_id, reply_id, e.to_string());
                return Err(e);
            }
        }
        chats.finish_stream(session_id);

        let content = chats
            .session(session_id)
            .and_then(|s| s.messages.iter().find(|m| m.id == reply_id))
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(content)
    }

    /// Run one request; `Some(text)` for JSON replies, `None` once a stream has been applied
    async fn exchange(
        &self,
        body: &Value,
        stream: bool,
        mut apply_delta: impl FnMut(&str) -> Result<(), SessionError>,
    ) -> Result<Option<String>> {
        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(body)
            .send()
            .await
            .context("Could not reach the workbench server")?;

        let status = response.status();
        if !status.is_success() {
            let error: Value = response.json().await.unwrap_or(Value::Null);
            let message = error
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Request failed");
            return Err(anyhow!("{message} ({status})"));
        }

        if !stream {
            let reply: Value = response.json().await.context("Invalid chat response")?;
            let text = reply
                .get("message")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("Chat response had no message"))?;
            apply_delta(text)?;
            return Ok(Some(text.to_string()));
        }

        let mut decoder = SseDecoder::new();
        let mut bytes = response.bytes_stream();
        let mut chunks = 0usize;
        'outer: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.context("Stream interrupted")?;
            chunks += 1;
            for frame in decoder.push(&chunk) {
                if frame.is_done() {
                    break 'outer;
                }
                if let Some(delta) = frame.delta() {
                    apply_delta(&delta)?;
                }
            }
        }
        for frame in decoder.finish() {
            if let Some(delta) = frame.delta() {
                apply_delta(&delta)?;
            }
        }
        debug!(chunks, "Stream consumed");
        Ok(None)
    }
}
