//! Agent module - the prompt-driven tool calling loop.
//!
//! This module provides:
//! - the system prompt and corrective replies
//! - the response parser for model output
//! - the dispatch engine resolving tool calls against the registry
//! - the Conversation runner with its retry budget

mod dispatch;
mod parser;
mod prompt;
mod runner;

pub use dispatch::{Dispatch, dispatch};
pub use parser::{ParsedResponse, ToolCallRequest, parse_response};
pub use prompt::{NOT_UNDERSTOOD, render_system_prompt, tool_error_message, unknown_tool_message, weather_query};
pub use runner::{Conversation, LoopConfig, LoopOutcome, LoopState, RetryPolicy};
