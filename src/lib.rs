//! Funcloop - tool calling for models without native function calling
//!
//! The model is told about the available tools in its system prompt and asked
//! to answer with JSON. Funcloop parses each reply, runs the requested tool,
//! feeds the result back and repeats until the model calls `finalResponse`
//! or the retry budget runs out.

pub mod agent;
pub mod error;
pub mod llm;
pub mod tools;

pub use error::{FuncloopError, Result};
