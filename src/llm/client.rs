//! Core LLM client trait, its error type, and a scripted mock

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{GenerateOptions, Message};

/// A chat-capable model endpoint.
///
/// One call is one turn: the full ordered conversation goes in, one assistant
/// text comes out. Streaming clients deliver chunks to `options.sink` before
/// returning, but the returned string is always the complete output.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, messages: &[Message], options: &GenerateOptions) -> Result<String, LlmError>;

    /// Model name used for requests
    fn model(&self) -> &str;
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chunk sink rejected output: {0}")]
    Sink(String),
}

/// Mock client that replays a fixed script of replies.
///
/// Every request is recorded so tests can inspect what the loop sent.
/// When a sink is supplied, each reply is delivered word by word first.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<Vec<Message>>>,
    model: String,
}

impl MockLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    /// Script replies that may include transport failures
    pub fn with_results<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, LlmError>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            model: "mock-model".to_string(),
        }
    }

    /// Snapshot of every conversation sent so far
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, messages: &[Message], options: &GenerateOptions) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages.to_vec());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("mock script exhausted".to_string())))?;

        if let Some(sink) = &options.sink {
            for piece in reply.split_inclusive(' ') {
                sink.on_chunk(piece.as_bytes())?;
            }
        }

        Ok(reply)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CollectingSink;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockLlmClient::new(["first", "second"]);
        let options = GenerateOptions::new();

        let a = mock.generate(&[Message::human("hi")], &options).await.unwrap();
        let b = mock.generate(&[Message::human("again")], &options).await.unwrap();

        assert_eq!(a, "first");
        assert_eq!(b, "second");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.remaining(), 0);
        assert_eq!(mock.model(), "mock-model");
    }

    #[tokio::test]
    async fn test_mock_exhausted_script_is_an_error() {
        let mock = MockLlmClient::new(Vec::<String>::new());
        let result = mock.generate(&[], &GenerateOptions::new()).await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockLlmClient::new(["ok"]);
        let messages = vec![Message::system("sys"), Message::human("question")];
        mock.generate(&messages, &GenerateOptions::new()).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], messages);
    }

    #[tokio::test]
    async fn test_mock_streams_to_sink() {
        let mock = MockLlmClient::new(["hello streaming world"]);
        let sink = Arc::new(CollectingSink::new());
        let options = GenerateOptions::new().with_sink(sink.clone());

        let text = mock.generate(&[], &options).await.unwrap();

        assert_eq!(text, "hello streaming world");
        assert_eq!(sink.chunk_count(), 3);
        assert_eq!(sink.text(), "hello streaming world");
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let mock = MockLlmClient::with_results([Err(LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        })]);
        let result = mock.generate(&[], &GenerateOptions::new()).await;
        assert!(matches!(result, Err(LlmError::Api { status: 500, .. })));
    }
}
