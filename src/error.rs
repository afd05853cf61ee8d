//! Error types for funcloop
//!
//! Centralized error handling using thiserror. Only fatal outcomes live here;
//! recoverable problems (malformed output, unknown tools, tool failures) are
//! folded back into the conversation by the agent loop.

use thiserror::Error;

use crate::llm::LlmError;

/// All error types that can end a funcloop run
#[derive(Debug, Error)]
pub enum FuncloopError {
    /// The retry budget ran out while the loop was still running
    #[error("retries exhausted after {turns} turns")]
    RetriesExhausted { turns: u32 },

    /// The hard turn ceiling was reached (errors-only retry policy)
    #[error("turn limit of {turns} reached without a final response")]
    TurnLimit { turns: u32 },

    /// The model client failed outright
    #[error("transport error: {0}")]
    Transport(#[from] LlmError),

    /// The caller cancelled the run
    #[error("conversation cancelled")]
    Cancelled,

    /// A single turn took longer than its deadline
    #[error("turn timed out after {ms}ms")]
    TurnTimeout { ms: u64 },

    /// Invalid configuration or tool registration
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FuncloopError {
    /// Whether the error came from the model endpoint rather than the loop itself
    pub fn is_transport(&self) -> bool {
        matches!(self, FuncloopError::Transport(_))
    }
}

/// Result type alias for funcloop operations
pub type Result<T> = std::result::Result<T, FuncloopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_error() {
        let err = FuncloopError::RetriesExhausted { turns: 3 };
        assert_eq!(err.to_string(), "retries exhausted after 3 turns");
    }

    #[test]
    fn test_turn_limit_error() {
        let err = FuncloopError::TurnLimit { turns: 16 };
        assert_eq!(err.to_string(), "turn limit of 16 reached without a final response");
    }

    #[test]
    fn test_transport_error_conversion() {
        let llm_err = LlmError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        let err: FuncloopError = llm_err.into();
        assert!(err.is_transport());
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_turn_timeout_error() {
        let err = FuncloopError::TurnTimeout { ms: 500 };
        assert_eq!(err.to_string(), "turn timed out after 500ms");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: FuncloopError = json_err.into();
        assert!(matches!(err, FuncloopError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(FuncloopError::Cancelled)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
