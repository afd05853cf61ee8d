//! LLM Client Layer - Ollama chat integration with streaming
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - OllamaClient implementation
//! - Streaming sinks and NDJSON line buffering

pub mod client;
pub mod ollama;
pub mod streaming;
pub mod types;

pub use client::{LlmClient, LlmError, MockLlmClient};
pub use ollama::{OllamaClient, OllamaConfig};
pub use streaming::{CollectingSink, NdjsonDecoder, StdoutSink};
pub use types::{ChunkSink, GenerateOptions, Message, Role};
