//! Dispatch engine - turns a parsed tool call into the loop's next step

use log::{info, warn};

use super::parser::ToolCallRequest;
use super::prompt::{tool_error_message, unknown_tool_message};
use crate::llm::Message;
use crate::tools::{ToolError, ToolRegistry};

/// Outcome of dispatching one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The tool ran; append `message` and keep going.
    /// `is_error` marks a handler failure reported back to the model.
    Continue { message: Message, is_error: bool },
    /// The sentinel was called; the conversation is over
    Terminate(String),
    /// The tool does not exist; append the corrective message and retry
    Reject(Message),
}

/// Resolve and run a tool call.
///
/// Checked in order: sentinel, registry membership, invocation. Handler
/// failures never abort; they come back as an error result so the model can
/// adjust its call.
pub async fn dispatch(request: &ToolCallRequest, registry: &ToolRegistry) -> Dispatch {
    if ToolRegistry::is_sentinel(&request.tool_name) {
        let answer = request.final_text();
        info!("Final response: {}", answer);
        return Dispatch::Terminate(answer);
    }

    if !registry.contains(&request.tool_name) {
        warn!("Invalid function call: {:?}, prompting model to try again", request);
        return reject(&request.tool_name);
    }

    match registry.invoke(&request.tool_name, &request.input).await {
        Ok(text) => Dispatch::Continue {
            message: Message::human(text),
            is_error: false,
        },
        Err(ToolError::UnknownTool(name)) => reject(&name),
        Err(err) => {
            warn!("Tool {} failed: {}", request.tool_name, err);
            Dispatch::Continue {
                message: Message::human(tool_error_message(&request.tool_name, &err)),
                is_error: true,
            }
        }
    }
}

fn reject(name: &str) -> Dispatch {
    Dispatch::Reject(Message::human(unknown_tool_message(name)))
}
