//! Message types exchanged with the language model
//!
//! The conversation is a plain ordered list of role-tagged text messages.
//! Tool calling is negotiated in-band through the message text, so there are
//! no structured tool-use blocks here.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::client::LlmError;

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
}

impl Role {
    /// Role name as understood by chat-style endpoints
    pub fn as_chat_role(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Ai => "assistant",
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a human message
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    /// Create an AI message
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// Receives incremental output while a streamed generation is in flight.
///
/// Returning an error aborts the generation.
pub trait ChunkSink: Send + Sync {
    fn on_chunk(&self, chunk: &[u8]) -> Result<(), LlmError>;
}

/// Per-call generation options
#[derive(Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    /// When set, the client streams and feeds every chunk to the sink
    pub sink: Option<Arc<dyn ChunkSink>>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ChunkSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.sink.is_some()
    }
}

impl fmt::Debug for GenerateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateOptions")
            .field("temperature", &self.temperature)
            .field("streaming", &self.is_streaming())
            .finish()
    }
}
