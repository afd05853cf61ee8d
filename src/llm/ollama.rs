//! Ollama API client implementation
//!
//! This module implements the LlmClient trait for Ollama's `/api/chat`
//! endpoint, in both blocking and NDJSON-streaming form.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use super::client::{LlmClient, LlmError};
use super::streaming::NdjsonDecoder;
use super::types::{GenerateOptions, Message};

/// Default Ollama server
pub const DEFAULT_URL: &str = "http://localhost:11434";

/// Default model to use
pub const DEFAULT_MODEL: &str = "llama3.2";

const WIRE_TARGET: &str = "funcloop::wire";

/// Configuration for the Ollama client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub timeout: Duration,
    /// Log full request and response bodies
    pub wirelog: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
            wirelog: false,
        }
    }
}

/// One line of a chat reply (the whole body when not streaming)
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChatChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChunkMessage {
    #[serde(default)]
    content: String,
}

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Chat endpoint URL; a bare `host:port` is treated as plain http
    fn endpoint(&self) -> String {
        let base = self.config.url.trim_end_matches('/');
        if base.contains("://") {
            format!("{}/api/chat", base)
        } else {
            format!("http://{}/api/chat", base)
        }
    }

    /// Build the request body for the chat endpoint
    fn build_request(&self, messages: &[Message], options: &GenerateOptions) -> Value {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "role": m.role.as_chat_role(),
                    "content": m.content
                })
            })
            .collect();

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "stream": options.is_streaming()
        });

        if let Some(temperature) = options.temperature {
            body["options"] = json!({ "temperature": temperature });
        }

        body
    }

    /// Decode one reply object into its text, surfacing in-band errors
    fn parse_chunk(&self, raw: &str) -> Result<ChatChunk, LlmError> {
        if self.config.wirelog {
            info!(target: WIRE_TARGET, "<< {}", raw);
        }
        let chunk: ChatChunk = serde_json::from_str(raw)?;
        if let Some(error) = chunk.error {
            return Err(LlmError::InvalidResponse(error));
        }
        Ok(chunk)
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, LlmError> {
        let url = self.endpoint();
        if self.config.wirelog {
            info!(target: WIRE_TARGET, ">> POST {} {}", url, body);
        }

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(response)
    }

    async fn generate_blocking(&self, body: &Value) -> Result<String, LlmError> {
        let response = self.send(body).await?;
        let raw = response.text().await?;
        let chunk = self.parse_chunk(&raw)?;

        chunk
            .message
            .map(|m| m.content)
            .ok_or_else(|| LlmError::InvalidResponse("missing message".to_string()))
    }

    async fn generate_streaming(&self, body: &Value, options: &GenerateOptions) -> Result<String, LlmError> {
        let response = self.send(body).await?;
        let mut stream = response.bytes_stream();
        let mut decoder = NdjsonDecoder::new();
        let mut text = String::new();
        let mut done = false;

        while let Some(bytes) = stream.next().await {
            let bytes = bytes?;
            for line in decoder.push(&bytes) {
                done |= self.absorb_line(&line, options, &mut text)?;
            }
        }
        if let Some(line) = decoder.finish() {
            done |= self.absorb_line(&line, options, &mut text)?;
        }

        if !done {
            debug!("Stream ended without a done marker");
        }
        Ok(text)
    }

    /// Forward one streamed line to the sink and append it to the buffer
    fn absorb_line(&self, line: &str, options: &GenerateOptions, text: &mut String) -> Result<bool, LlmError> {
        let chunk = self.parse_chunk(line)?;
        if let Some(message) = chunk.message
            && !message.content.is_empty()
        {
            if let Some(sink) = &options.sink {
                sink.on_chunk(message.content.as_bytes())?;
            }
            text.push_str(&message.content);
        }
        Ok(chunk.done)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, messages: &[Message], options: &GenerateOptions) -> Result<String, LlmError> {
        let body = self.build_request(messages, options);
        debug!(
            "Sending {} messages to {} (model {}, streaming {})",
            messages.len(),
            self.endpoint(),
            self.config.model,
            options.is_streaming()
        );

        if options.is_streaming() {
            self.generate_streaming(&body, options).await
        } else {
            self.generate_blocking(&body).await
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("url", &self.config.url)
            .field("model", &self.config.model)
            .finish()
    }
}
