//! Streaming support for LLM responses.
//!
//! Ollama streams newline-delimited JSON objects. Network chunks do not line up
//! with object boundaries (or even UTF-8 boundaries), so bytes are buffered
//! until a full line is available.

use std::io::Write;
use std::sync::Mutex;

use super::client::LlmError;
use super::types::ChunkSink;

/// Splits a byte stream into complete newline-terminated lines.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every line completed by them.
    ///
    /// Blank lines are dropped.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest);
        let trimmed = text.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }
}

/// Prints chunks to stdout as they arrive
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ChunkSink for StdoutSink {
    fn on_chunk(&self, chunk: &[u8]) -> Result<(), LlmError> {
        let mut out = std::io::stdout().lock();
        out.write_all(chunk)
            .and_then(|_| out.flush())
            .map_err(|e| LlmError::Sink(e.to_string()))
    }
}

/// Keeps every chunk in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    chunks: Mutex<Vec<Vec<u8>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// All chunks concatenated
    pub fn text(&self) -> String {
        let chunks = self.chunks.lock().unwrap_or_else(|e| e.into_inner());
        let bytes: Vec<u8> = chunks.iter().flatten().copied().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl ChunkSink for CollectingSink {
    fn on_chunk(&self, chunk: &[u8]) -> Result<(), LlmError> {
        self.chunks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(chunk.to_vec());
        Ok(())
    }
}
