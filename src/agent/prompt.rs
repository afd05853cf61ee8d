//! Prompt text: the tool-enumerating system prompt and corrective replies

use crate::error::Result;
use crate::tools::{FINAL_RESPONSE_TOOL, ToolError, ToolRegistry};

/// Sent when the model's reply could not be read as a tool call
pub const NOT_UNDERSTOOD: &str =
    "Sorry, I don't understand. Please try again, responding only with a JSON object in the required tool format.";

/// Render the system prompt listing every registered tool
pub fn render_system_prompt(registry: &ToolRegistry) -> Result<String> {
    let tools = serde_json::to_string(&registry.list())?;

    Ok(format!(
        r#"You have access to the following tools:

{tools}

To use a tool, respond with a JSON object with the following structure:
{{
	"tool": <name of the called tool>,
	"tool_input": <parameters for the tool matching the above JSON schema>
}}

When you know the answer, call the "{FINAL_RESPONSE_TOOL}" tool with your answer as its "response".
"#
    ))
}

/// Default question when no explicit query is given
pub fn weather_query(location: &str) -> String {
    format!("What's the weather like in {}?", location)
}

/// Corrective reply for a tool name the registry does not know
pub fn unknown_tool_message(name: &str) -> String {
    format!("Tool \"{}\" does not exist, please try again with one of the listed tools.", name)
}

/// Result reply for a tool whose handler failed
pub fn tool_error_message(name: &str, error: &ToolError) -> String {
    format!("Tool \"{}\" returned an error: {}. Please correct the call and try again.", name, error)
}
