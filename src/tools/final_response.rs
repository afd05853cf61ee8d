//! finalResponse - the sentinel tool that ends a conversation

use async_trait::async_trait;
use serde_json::Value;

use super::{Tool, ToolError, ToolInput, required_str};

/// Reserved tool name signalling the final answer
pub const FINAL_RESPONSE_TOOL: &str = "finalResponse";

/// Always registered. The loop terminates on a call to it instead of invoking
/// it; advertising it in the prompt makes models far more likely to finish
/// with a well-formed answer.
pub struct FinalResponseTool;

#[async_trait]
impl Tool for FinalResponseTool {
    fn name(&self) -> &str {
        FINAL_RESPONSE_TOOL
    }

    fn description(&self) -> &str {
        "Provide the final response to the user query"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "response": {
                    "type": "string",
                    "description": "The final response to the user query"
                }
            },
            "required": ["response"]
        })
    }

    async fn invoke(&self, input: &ToolInput) -> Result<String, ToolError> {
        required_str(input, "response").map(str::to_string)
    }
}
