//! SSE decoding for OpenAI-style chat completion streams
//!
//! The server relays upstream bytes untouched; decoding happens on the
//! client side and in tests.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

// ============================================================================
// SSE Decoder
// ============================================================================

/// Line-buffered SSE decoder
///
/// Partial lines are held as raw bytes until the next push, so a multi-byte
/// character split across chunks decodes intact. The buffer is bounded so a
/// stream that never sends a newline cannot grow it forever.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Maximum buffer size (1MB)
    const MAX_BUFFER_SIZE: usize = 1024 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes and return every complete `data:` frame
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            // Comments (": keep-alive") and event/id/retry fields carry no payload
            if let Some(data) = line.strip_prefix("data:") {
                frames.push(SseFrame {
                    data: data.trim_start().to_string(),
                });
            }
        }

        if self.buffer.len() > Self::MAX_BUFFER_SIZE {
            tracing::warn!(
                "SSE buffer exceeded {}KB limit, truncating",
                Self::MAX_BUFFER_SIZE / 1024
            );
            let keep_from = self.buffer.len() - (Self::MAX_BUFFER_SIZE / 2);
            self.buffer.drain(..keep_from);
        }
        frames
    }

    pub fn push_str(&mut self, s: &str) -> Vec<SseFrame> {
        self.push(s.as_bytes())
    }

    /// Flush a final unterminated line, if any
    pub fn finish(&mut self) -> Vec<SseFrame> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return Vec::new();
        }
        self.push(b"\n")
    }

    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty()
    }
}

// ============================================================================
// SSE Frame
// ============================================================================

/// One `data:` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub data: String,
}

impl SseFrame {
    /// The `[DONE]` terminator
    pub fn is_done(&self) -> bool {
        self.data == "[DONE]"
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data)
            .map_err(|e| anyhow::anyhow!("SSE JSON parse error: {}. Data: {}", e, self.preview()))
    }

    pub fn try_parse<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_str(&self.data).ok()
    }

    /// Text delta carried by a chat completion chunk (`choices[0].delta.content`)
    ///
    /// Frames that are not JSON, or carry no content, yield `None`.
    pub fn delta(&self) -> Option<String> {
        let chunk: Value = self.try_parse()?;
        chunk
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn preview(&self) -> String {
        match self.data.char_indices().nth(200) {
            Some((idx, _)) => format!("{}...", &self.data[..idx]),
            None => self.data.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
